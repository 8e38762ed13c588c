//! 走法执行
//!
//! 调用方必须先验证；同一走法执行两次可能重复吃子。

use tracing::{debug, info};

use crate::board::Board;
use crate::error::{ChessError, Result};
use crate::layout::PieceLayout;
use crate::notation::Move;
use crate::piece::{Piece, Side};

/// 走法执行器
pub struct MoveExecutor;

impl MoveExecutor {
    /// 只修改棋盘，返回被吃的棋子（模拟搜索使用）
    ///
    /// 出错时不修改棋盘。
    pub fn apply_to_board(board: &mut Board, mv: &Move) -> Result<Option<Piece>> {
        let mover = board
            .get(mv.from)
            .ok_or(ChessError::NoPiece { square: mv.from })?;
        let placed = Self::placed_piece(mover, mv)?;

        let captured = board.remove(mv.to);
        board.remove(mv.from);
        board.set(mv.to, Some(placed));
        Ok(captured)
    }

    /// 执行走法：更新棋盘，被吃棋子移到棋盘外，移动棋子的摆放记录
    pub fn apply(board: &mut Board, layout: &mut PieceLayout, mv: &Move) -> Result<Option<Piece>> {
        let captured = Self::apply_to_board(board, mv)?;

        if let Some(victim) = captured {
            let slot = layout.park(mv.to, victim.side);
            info!(
                "Captured {:?} {:?} on {}, relocated to {}",
                victim.side,
                victim.piece_type,
                mv.to,
                slot.map(|s| s.to_string()).unwrap_or_else(|| "?".to_string())
            );
        }

        if let Some(placed) = board.get(mv.to) {
            if mv.promotion.is_some() {
                info!("Pawn promoted to {:?} at {}", placed.piece_type, mv.to);
            }
            if !layout.relocate(mv.from, mv.to, placed) {
                debug!("No layout entry on {}", mv.from);
            }
        }

        Ok(captured)
    }

    /// 解析并执行走法字符串；升变字符无效时不做任何修改
    pub fn apply_str(board: &mut Board, layout: &mut PieceLayout, text: &str) -> Result<Move> {
        let mv = Move::parse(text)?;
        Self::apply(board, layout, &mv)?;
        Ok(mv)
    }

    /// 落到目标格的棋子：升变时换成同方的新类型
    fn placed_piece(mover: Piece, mv: &Move) -> Result<Piece> {
        match mv.promotion {
            None => Ok(mover),
            Some(piece_type) if piece_type.promotion_char().is_some() => {
                Ok(Piece::new(piece_type, mover.side))
            }
            Some(piece_type) => Err(ChessError::InvalidPromotion {
                letter: piece_type.to_fen_char(Side::Black),
            }),
        }
    }
}
