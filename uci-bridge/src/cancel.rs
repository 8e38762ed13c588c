//! 请求取消

use std::sync::Arc;

use tokio::sync::watch;

/// 取消句柄（发送端），可克隆后交给 Ctrl-C 处理任务
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

/// 取消信号（接收端）
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// 取消正在进行的请求
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSignal {
    /// 永远不会触发的信号
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    /// 忽略之前已经发出的取消，只响应之后的
    pub fn arm(&mut self) {
        self.rx.borrow_and_update();
    }

    /// 等待下一次取消
    pub async fn cancelled(&mut self) {
        while self.rx.changed().await.is_ok() {
            if *self.rx.borrow_and_update() {
                return;
            }
        }
        // 发送端已全部释放，不会再有取消
        std::future::pending::<()>().await
    }
}
