//! 引擎子进程
//!
//! 引擎只通过标准输入输出通信：发送 `position startpos moves ...` 和
//! `go depth N`，然后读取输出直到出现 `bestmove` 或 `Cannot execute move`。
//! stdout 与 stderr 由后台任务合并成一个流读取。

use std::process::Stdio;

use async_trait::async_trait;
use chess_rules::MoveHistory;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::buffer::LineBuffer;
use crate::cancel::CancelSignal;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::reply::{scan_chunk, ChunkReply, FALLBACK_MOVE};
use crate::source::MoveSource;

type BoxedReader = Box<dyn AsyncRead + Unpin + Send>;
type BoxedWriter = Box<dyn AsyncWrite + Unpin + Send>;

/// 引擎状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Spawned,
    Ready,
    SendingCommand,
    AwaitingResponse,
    Terminated,
}

struct EngineIo {
    reader: BoxedReader,
    writer: BoxedWriter,
    child: Option<Child>,
    pump: Option<JoinHandle<()>>,
}

/// 引擎进程
pub struct EngineProcess {
    config: EngineConfig,
    state: EngineState,
    io: Option<EngineIo>,
    buffer: LineBuffer,
    /// 由本对象启动的进程才能在失败后重启
    respawnable: bool,
}

impl EngineProcess {
    /// 创建（尚未启动）
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: EngineState::Uninitialized,
            io: None,
            buffer: LineBuffer::new(),
            respawnable: false,
        }
    }

    /// 基于已有的读写流创建，状态直接为 Ready
    pub fn from_streams<R, W>(reader: R, writer: W, config: EngineConfig) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Self {
            config,
            state: EngineState::Ready,
            io: Some(EngineIo {
                reader: Box::new(reader),
                writer: Box::new(writer),
                child: None,
                pump: None,
            }),
            buffer: LineBuffer::new(),
            respawnable: false,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.io.is_some()
    }

    /// 启动引擎进程
    ///
    /// 启动失败时记录错误并保持原状态，之后的发送都是空操作。
    pub async fn initialize(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }

        let io = match self.spawn() {
            Ok(io) => io,
            Err(e) => {
                error!("{}", e);
                return Err(e);
            }
        };

        self.io = Some(io);
        self.buffer.clear();
        self.respawnable = true;
        self.state = EngineState::Spawned;

        if self.config.handshake {
            let secs = self.config.response_timeout_secs;
            let outcome = timeout(self.config.response_timeout(), self.handshake())
                .await
                .unwrap_or_else(|_| Err(EngineError::Timeout { secs }));
            if let Err(e) = outcome {
                error!("Engine handshake failed: {}", e);
                self.teardown();
                return Err(e);
            }
        }

        self.state = EngineState::Ready;
        info!(program = %self.config.program, "Engine started");
        Ok(())
    }

    fn spawn(&self) -> Result<EngineIo> {
        // 管道两端在父进程中只保留需要的一侧
        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;

        let (stdin, stdout, stderr) =
            match (child.stdin.take(), child.stdout.take(), child.stderr.take()) {
                (Some(stdin), Some(stdout), Some(stderr)) => (stdin, stdout, stderr),
                _ => return Err(EngineError::NotRunning),
            };

        let capacity = self.config.read_buffer_size.max(1);
        let (reader, sink) = tokio::io::duplex(capacity);
        let pump = tokio::spawn(pump_output(stdout, stderr, sink, capacity));

        Ok(EngineIo {
            reader: Box::new(reader),
            writer: Box::new(stdin),
            child: Some(child),
            pump: Some(pump),
        })
    }

    /// 发送一行命令（自动追加换行）；引擎未运行时为空操作
    pub async fn send(&mut self, command: &str) -> Result<()> {
        let Some(io) = self.io.as_mut() else {
            debug!(command, "Engine not running, command dropped");
            return Ok(());
        };

        debug!(command, "-> engine");
        io.writer.write_all(command.as_bytes()).await?;
        io.writer.write_all(b"\n").await?;
        io.writer.flush().await?;
        Ok(())
    }

    /// 读取一次，返回以换行结尾的完整块
    ///
    /// 没有换行时返回空串（数据进入残余）；输入结束时返回残余。
    pub async fn read_chunk(&mut self) -> Result<String> {
        let size = self.config.read_buffer_size.max(1);
        let io = self.io.as_mut().ok_or(EngineError::NotRunning)?;

        let mut raw = vec![0u8; size];
        let n = io.reader.read(&mut raw).await?;
        if n == 0 {
            Ok(self.buffer.finish())
        } else {
            Ok(self.buffer.feed(&raw[..n]))
        }
    }

    /// 请求引擎在当前对局历史下给出走法
    ///
    /// 本函数不会 `arm()` 取消信号：调用方 `arm()` 之后发出的取消，
    /// 即使早于本次调用也会生效。
    /// 任何失败都关闭引擎进程，避免本次残留的输出被当作下一次请求的应答。
    pub async fn request_move(
        &mut self,
        history: &MoveHistory,
        cancel: &CancelSignal,
    ) -> Result<String> {
        if self.state == EngineState::Terminated
            && self.respawnable
            && self.config.restart_on_failure
        {
            info!("Restarting engine");
            self.initialize().await?;
        }

        if !self.is_running() {
            return Err(EngineError::NotRunning);
        }

        let mut cancel = cancel.clone();
        let secs = self.config.response_timeout_secs;
        let limit = self.config.response_timeout();

        let outcome = tokio::select! {
            result = timeout(limit, self.exchange(history)) => {
                result.unwrap_or_else(|_| Err(EngineError::Timeout { secs }))
            }
            _ = cancel.cancelled() => Err(EngineError::Cancelled),
        };

        match &outcome {
            Ok(mv) => {
                info!("Engine Response: {}", mv);
                self.state = EngineState::Ready;
            }
            Err(e) => {
                warn!("Engine request failed: {}, closing engine", e);
                self.teardown();
            }
        }

        outcome
    }

    async fn exchange(&mut self, history: &MoveHistory) -> Result<String> {
        self.buffer.clear();
        self.state = EngineState::SendingCommand;
        self.send(&format!("position startpos moves {}", history.joined()))
            .await?;
        self.send(&format!("go depth {}", self.config.search_depth))
            .await?;
        self.state = EngineState::AwaitingResponse;
        self.await_best_move().await
    }

    async fn await_best_move(&mut self) -> Result<String> {
        loop {
            let chunk = self.read_chunk().await?;
            if chunk.is_empty() {
                if self.buffer.is_empty() {
                    return Err(EngineError::NoResponse);
                }
                continue;
            }

            match scan_chunk(&chunk) {
                ChunkReply::Rejected => {
                    return Err(EngineError::MoveRejected {
                        fallback: FALLBACK_MOVE.to_string(),
                    })
                }
                ChunkReply::BestMove(mv) => return Ok(mv),
                ChunkReply::Malformed(raw) => return Err(EngineError::MalformedBestMove { raw }),
                ChunkReply::Chatter => debug!(output = chunk.trim_end(), "<- engine"),
            }
        }
    }

    async fn handshake(&mut self) -> Result<()> {
        self.send("uci").await?;
        self.await_token("uciok").await?;
        self.send("isready").await?;
        self.await_token("readyok").await
    }

    async fn await_token(&mut self, token: &str) -> Result<()> {
        loop {
            let chunk = self.read_chunk().await?;
            if chunk.contains(token) {
                return Ok(());
            }
            if chunk.is_empty() && self.buffer.is_empty() {
                return Err(EngineError::NoResponse);
            }
        }
    }

    /// 关闭引擎：发出终止信号后立即返回，不等待进程退出
    pub fn teardown(&mut self) {
        if let Some(mut io) = self.io.take() {
            if let Some(pump) = io.pump.take() {
                pump.abort();
            }
            if let Some(child) = io.child.as_mut() {
                if let Err(e) = child.start_kill() {
                    debug!("Engine kill failed: {}", e);
                }
            }
            info!("Engine closed");
        }
        self.buffer.clear();
        if self.state != EngineState::Uninitialized {
            self.state = EngineState::Terminated;
        }
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[async_trait]
impl MoveSource for EngineProcess {
    async fn best_move(&mut self, history: &MoveHistory, cancel: &CancelSignal) -> Result<String> {
        self.request_move(history, cancel).await
    }

    fn is_running(&self) -> bool {
        EngineProcess::is_running(self)
    }

    fn shutdown(&mut self) {
        self.teardown();
    }
}

/// 把 stdout 和 stderr 合并写入同一个流，两者都结束后关闭
async fn pump_output(
    mut stdout: ChildStdout,
    mut stderr: ChildStderr,
    mut sink: DuplexStream,
    capacity: usize,
) {
    let mut out_buf = vec![0u8; capacity];
    let mut err_buf = vec![0u8; capacity];
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        let (read, from_stdout) = tokio::select! {
            read = stdout.read(&mut out_buf), if out_open => (read, true),
            read = stderr.read(&mut err_buf), if err_open => (read, false),
        };

        let n = match read {
            Ok(n) => n,
            Err(e) => {
                debug!("Engine pipe read failed: {}", e);
                0
            }
        };

        if n == 0 {
            if from_stdout {
                out_open = false;
            } else {
                err_open = false;
            }
            continue;
        }

        let data = if from_stdout {
            &out_buf[..n]
        } else {
            &err_buf[..n]
        };
        if sink.write_all(data).await.is_err() {
            break;
        }
    }

    if let Err(e) = sink.shutdown().await {
        debug!("Engine output close failed: {}", e);
    }
}
