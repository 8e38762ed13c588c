//! 走法来源抽象

use async_trait::async_trait;
use chess_rules::MoveHistory;

use crate::cancel::CancelSignal;
use crate::error::Result;

/// 根据对局历史给出下一步走法
///
/// 返回的是引擎原始文本（4 或 5 个字符），合法性由调用方检查。
#[async_trait]
pub trait MoveSource: Send {
    /// 请求下一步走法
    async fn best_move(&mut self, history: &MoveHistory, cancel: &CancelSignal) -> Result<String>;

    /// 是否可用
    fn is_running(&self) -> bool;

    /// 关闭
    fn shutdown(&mut self);
}
