//! 对局上下文
//!
//! 棋盘、摆放表、走法历史和视图参数集中在一个对象里，由分发器独占。

use chess_rules::{Board, MoveExecutor, MoveHistory, MoveValidator, Piece, PieceLayout, Side};
use chess_rules::{ChessError, Move};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::view::ViewSettings;

/// 玩家执白先走
pub const HUMAN_SIDE: Side = Side::White;

/// 引擎执黑
pub const ENGINE_SIDE: Side = Side::Black;

/// 对局状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Checkmate { winner: Side },
}

/// 回滚快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    board: Board,
    layout: PieceLayout,
    history: MoveHistory,
    status: GameStatus,
}

/// 对局上下文
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    board: Board,
    layout: PieceLayout,
    history: MoveHistory,
    view: ViewSettings,
    status: GameStatus,
}

impl GameSession {
    /// 标准开局
    pub fn new(view: ViewSettings) -> Self {
        let board = Board::initial();
        Self {
            layout: PieceLayout::from_board(&board),
            board,
            history: MoveHistory::new(),
            view,
            status: GameStatus::InProgress,
        }
    }

    /// 从指定局面开始（历史为空）
    pub fn from_board(board: Board, view: ViewSettings) -> Self {
        Self {
            layout: PieceLayout::from_board(&board),
            board,
            history: MoveHistory::new(),
            view,
            status: GameStatus::InProgress,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn layout(&self) -> &PieceLayout {
        &self.layout
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub fn view(&self) -> &ViewSettings {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewSettings {
        &mut self.view
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status != GameStatus::InProgress
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.clone(),
            layout: self.layout.clone(),
            history: self.history.clone(),
            status: self.status,
        }
    }

    /// 恢复快照（视图参数不受影响）
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.board = snapshot.board;
        self.layout = snapshot.layout;
        self.history = snapshot.history;
        self.status = snapshot.status;
    }

    /// 验证并执行一步，追加到历史；失败时不修改任何状态
    pub fn play(&mut self, mv: &Move, side: Side) -> Result<Option<Piece>, ChessError> {
        MoveValidator::validate(&self.board, mv, side)?;
        let captured = MoveExecutor::apply(&mut self.board, &mut self.layout, mv)?;
        self.history.push(*mv);
        debug!(side = ?side, "Played {}", mv);
        Ok(captured)
    }

    /// 检查 `side` 是否被将死，被将死时结束对局
    pub fn update_status(&mut self, side: Side) -> GameStatus {
        if MoveValidator::is_checkmate(&self.board, side) {
            self.status = GameStatus::Checkmate {
                winner: side.opponent(),
            };
        }
        self.status
    }

    pub fn in_check(&self, side: Side) -> bool {
        MoveValidator::is_in_check(&self.board, side)
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(ViewSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_rules::{PieceType, Square};

    fn mv(text: &str) -> Move {
        Move::parse(text).unwrap()
    }

    fn sq(name: &str) -> Square {
        Square::parse(name).unwrap()
    }

    #[test]
    fn test_play_appends_history() {
        let mut session = GameSession::default();
        session.play(&mv("e2e4"), HUMAN_SIDE).unwrap();
        session.play(&mv("e7e5"), ENGINE_SIDE).unwrap();

        assert_eq!(session.history().to_strings(), vec!["e2e4", "e7e5"]);
        assert_eq!(
            session.layout().piece_at(sq("e5")),
            Some(Piece::new(PieceType::Pawn, Side::Black))
        );
    }

    #[test]
    fn test_illegal_play_leaves_state() {
        let mut session = GameSession::default();
        let before = session.snapshot();

        assert!(session.play(&mv("e7e5"), HUMAN_SIDE).is_err());
        assert!(session.play(&mv("e2e5"), HUMAN_SIDE).is_err());
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_snapshot_restore_includes_capture_counters() {
        let mut session = GameSession::default();
        let before = session.snapshot();

        session.play(&mv("e2e4"), HUMAN_SIDE).unwrap();
        session.play(&mv("d7d5"), ENGINE_SIDE).unwrap();
        session.play(&mv("e4d5"), HUMAN_SIDE).unwrap();
        assert_eq!(session.layout().captured().count(Side::Black), 1);

        session.restore(before.clone());
        assert_eq!(session.snapshot(), before);
        assert_eq!(session.layout().captured().count(Side::Black), 0);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_update_status_on_mate() {
        let mut session = GameSession::default();
        for (text, side) in [
            ("f2f3", HUMAN_SIDE),
            ("e7e5", ENGINE_SIDE),
            ("g2g4", HUMAN_SIDE),
            ("d8h4", ENGINE_SIDE),
        ] {
            session.play(&mv(text), side).unwrap();
        }

        assert!(session.in_check(HUMAN_SIDE));
        assert_eq!(
            session.update_status(HUMAN_SIDE),
            GameStatus::Checkmate { winner: Side::Black }
        );
        assert!(session.is_over());
    }
}
