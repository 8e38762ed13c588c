//! 引擎配置

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 引擎配置
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 引擎可执行文件
    pub program: String,
    /// 启动参数，默认无参数
    pub args: Vec<String>,
    /// `go depth <N>` 的搜索深度
    pub search_depth: u32,
    /// 每次从管道读取的字节数
    pub read_buffer_size: usize,
    /// 单次请求超时（秒）
    pub response_timeout_secs: u64,
    /// 启动后是否先完成 uci / isready 握手
    pub handshake: bool,
    /// 超时或取消后被关闭的进程，是否在下次请求时重新启动
    pub restart_on_failure: bool,
}

impl EngineConfig {
    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "komodo".to_string(),
            args: Vec::new(),
            search_depth: 7,
            read_buffer_size: 4096,
            response_timeout_secs: 30,
            handshake: false,
            restart_on_failure: true,
        }
    }
}
