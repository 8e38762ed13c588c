//! 外部走棋引擎桥接
//!
//! 包含:
//! - 引擎子进程的启动、关闭与输出合流
//! - 按行缓冲的读取（管道读取可能把一行截断）
//! - `bestmove` / `Cannot execute move` 应答解析
//! - 请求超时与取消
//! - `MoveSource` trait，供上层替换引擎实现

mod buffer;
mod cancel;
mod config;
mod error;
mod process;
mod reply;
mod source;

pub use buffer::LineBuffer;
pub use cancel::{CancelHandle, CancelSignal};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use process::{EngineProcess, EngineState};
pub use reply::{extract_best_move, scan_chunk, ChunkReply, BEST_MOVE_TOKEN, FALLBACK_MOVE, REJECTED_TOKEN};
pub use source::MoveSource;
