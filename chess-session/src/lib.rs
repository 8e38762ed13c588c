//! 人机对局会话
//!
//! 把规则库和引擎桥接组合起来：解析用户命令、维护对局上下文、
//! 在引擎失败时回滚。

pub mod command;
pub mod dispatcher;
pub mod error;
pub mod session;
pub mod settings;
pub mod view;

pub use command::Command;
pub use dispatcher::{CommandDispatcher, MoveReport, Outcome};
pub use error::{CommandError, SessionError};
pub use session::{GameSession, GameStatus, Snapshot, ENGINE_SIDE, HUMAN_SIDE};
pub use settings::SessionSettings;
pub use view::{Orbit, ViewSettings};
