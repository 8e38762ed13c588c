//! 错误类型定义

use thiserror::Error;

/// 引擎通信错误
///
/// 对上层来说都属于“引擎协议失败”，需要整体回滚当前走法。
#[derive(Error, Debug)]
pub enum EngineError {
    /// 无法启动引擎进程
    #[error("Failed to start engine '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// 引擎未运行
    #[error("Engine is not running")]
    NotRunning,

    /// 管道读写错误
    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 等待应答超时
    #[error("Engine did not answer within {secs} seconds")]
    Timeout { secs: u64 },

    /// 请求被取消
    #[error("Engine request cancelled")]
    Cancelled,

    /// 引擎没有输出（进程可能已退出）
    #[error("Engine did not produce a valid response")]
    NoResponse,

    /// bestmove 后面的走法长度不是 4 或 5
    #[error("Malformed bestmove response: '{raw}'")]
    MalformedBestMove { raw: String },

    /// 引擎报告无法执行走法；fallback 只是失败标记，不能当作可走的棋
    #[error("Engine cannot execute move (fallback {fallback})")]
    MoveRejected { fallback: String },
}

/// 引擎操作结果类型
pub type Result<T> = std::result::Result<T, EngineError>;
