//! 错误类型定义

use chess_rules::ChessError;
use thiserror::Error;
use uci_bridge::EngineError;

/// 命令解析错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    /// 空行
    #[error("Empty command")]
    Empty,

    /// 未知命令
    #[error("Unknown command '{keyword}'")]
    UnknownCommand { keyword: String },

    /// 参数个数不对
    #[error("'{command}' expects {expected} argument(s), got {got}")]
    ArgumentCount {
        command: &'static str,
        expected: usize,
        got: usize,
    },

    /// 参数不是数字
    #[error("Invalid number '{value}'")]
    InvalidNumber { value: String },

    /// 参数超出范围
    #[error("{what} out of range: {value}")]
    OutOfRange { what: &'static str, value: f32 },
}

/// 会话错误
#[derive(Error, Debug)]
pub enum SessionError {
    /// 命令格式错误，未修改任何状态
    #[error(transparent)]
    Command(#[from] CommandError),

    /// 用户走法不合法，未修改任何状态
    #[error(transparent)]
    Move(#[from] ChessError),

    /// 引擎通信失败，走法已回滚
    #[error("Engine failure, move rolled back: {0}")]
    Engine(#[from] EngineError),

    /// 引擎给出的走法不合法，走法已回滚
    #[error("Engine proposed illegal move '{mv}', move rolled back: {source}")]
    IllegalEngineMove {
        mv: String,
        #[source]
        source: ChessError,
    },
}

impl SessionError {
    /// 是否发生了回滚（引擎侧失败）
    pub fn is_rollback(&self) -> bool {
        matches!(
            self,
            SessionError::Engine(_) | SessionError::IllegalEngineMove { .. }
        )
    }
}
