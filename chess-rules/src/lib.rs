//! 国际象棋规则库
//!
//! 包含:
//! - 棋子、格子、棋盘等核心数据结构
//! - 走法字符串（UCI 坐标记法）的解析与格式化
//! - 走法合法性验证、将军检测、将死搜索
//! - 走法执行（吃子、升变）及渲染端使用的棋子摆放表

mod board;
mod constants;
mod error;
mod executor;
mod layout;
mod moves;
mod notation;
mod piece;

pub use board::Board;
pub use constants::*;
pub use error::{ChessError, Result};
pub use executor::MoveExecutor;
pub use layout::{CaptureCounters, Location, LocationEntry, PieceLayout, Placement};
pub use moves::MoveValidator;
pub use notation::{Move, MoveHistory};
pub use piece::{Piece, PieceType, Side, Square};
