//! 走法验证、将军检测与将死搜索
//!
//! 只实现以下规则子集：各兵种走法、路径阻挡、吃子、升变、走子方归属。
//! 没有王车易位、吃过路兵，也不禁止走后让己方王被将军。

use tracing::warn;

use crate::board::Board;
use crate::error::{ChessError, Result};
use crate::executor::MoveExecutor;
use crate::notation::Move;
use crate::piece::{Piece, PieceType, Side, Square};

/// 走法验证器
pub struct MoveValidator;

impl MoveValidator {
    /// 验证走法，失败时返回拒绝原因（用户交互层使用）
    ///
    /// 按顺序检查，第一条失败的规则即为结果：
    /// 起终点、起点归属、终点占用、兵种几何与路径。
    pub fn validate(board: &Board, mv: &Move, side: Side) -> Result<()> {
        if mv.from == mv.to {
            return Err(ChessError::SameSquare { square: mv.from });
        }

        let piece = board
            .get(mv.from)
            .ok_or(ChessError::NoPiece { square: mv.from })?;
        if piece.side != side {
            return Err(ChessError::NotYourPiece { square: mv.from });
        }

        if let Some(target) = board.get(mv.to) {
            if target.side == side {
                return Err(ChessError::FriendlyPiece { square: mv.to });
            }
        }

        Self::check_geometry(board, mv, piece)?;
        Self::check_promotion(mv, piece)
    }

    /// 解析并验证走法字符串
    pub fn validate_str(board: &Board, text: &str, side: Side) -> Result<Move> {
        let mv = Move::parse(text)?;
        Self::validate(board, &mv, side)?;
        Ok(mv)
    }

    /// 走法字符串是否合法（不输出原因，搜索内部使用）
    pub fn is_legal(board: &Board, text: &str, side: Side) -> bool {
        Self::validate_str(board, text, side).is_ok()
    }

    /// 走法是否合法
    pub fn is_move_legal(board: &Board, mv: &Move, side: Side) -> bool {
        Self::validate(board, mv, side).is_ok()
    }

    /// 兵种几何规则
    fn check_geometry(board: &Board, mv: &Move, piece: Piece) -> Result<()> {
        let (df, dr) = mv.delta();
        let (adf, adr) = (df.abs(), dr.abs());

        match piece.piece_type {
            PieceType::Rook => {
                if adf != 0 && adr != 0 {
                    return Err(ChessError::RookNotStraight);
                }
                Self::require_clear_path(board, mv, PieceType::Rook)
            }
            PieceType::Bishop => {
                if adf != adr {
                    return Err(ChessError::BishopNotDiagonal);
                }
                Self::require_clear_path(board, mv, PieceType::Bishop)
            }
            PieceType::Queen => {
                if adf != adr && adf != 0 && adr != 0 {
                    return Err(ChessError::QueenNotLine);
                }
                Self::require_clear_path(board, mv, PieceType::Queen)
            }
            PieceType::Knight => {
                // 马可以越子，不检查路径
                if (adf, adr) == (2, 1) || (adf, adr) == (1, 2) {
                    Ok(())
                } else {
                    Err(ChessError::KnightNotL)
                }
            }
            PieceType::King => {
                if adf > 1 || adr > 1 {
                    Err(ChessError::KingTooFar)
                } else {
                    Ok(())
                }
            }
            PieceType::Pawn => Self::check_pawn(board, mv, piece.side, df, dr),
        }
    }

    /// 兵的规则
    ///
    /// 直走一步或两步终点必须为空，两步只能从本方起始行出发（中间格不检查）；
    /// 斜走一步必须吃子。
    fn check_pawn(board: &Board, mv: &Move, side: Side, df: i8, dr: i8) -> Result<()> {
        let forward = side.forward();
        let target = board.get(mv.to);

        if df == 0 && dr == forward {
            if target.is_some() {
                return Err(ChessError::PawnForwardBlocked);
            }
            Ok(())
        } else if df == 0 && dr == 2 * forward {
            if mv.from.rank != side.pawn_rank() {
                return Err(ChessError::PawnDoubleStep);
            }
            if target.is_some() {
                return Err(ChessError::PawnForwardBlocked);
            }
            Ok(())
        } else if df.abs() == 1 && dr == forward {
            if target.is_none() {
                return Err(ChessError::PawnCaptureOnly);
            }
            Ok(())
        } else {
            Err(ChessError::PawnBadStep)
        }
    }

    /// 升变后缀只允许出现在走到对方底线的兵上
    fn check_promotion(mv: &Move, piece: Piece) -> Result<()> {
        if mv.promotion.is_some()
            && (piece.piece_type != PieceType::Pawn || mv.to.rank != piece.side.last_rank())
        {
            return Err(ChessError::PromotionNotAllowed { square: mv.to });
        }
        Ok(())
    }

    fn require_clear_path(board: &Board, mv: &Move, piece_type: PieceType) -> Result<()> {
        if Self::path_clear(board, mv.from, mv.to) {
            Ok(())
        } else {
            Err(ChessError::PathBlocked { piece_type })
        }
    }

    /// 检查起终点之间（不含两端）的格子是否全空
    ///
    /// 沿单位步长前进，只对直线或斜线有意义。
    pub fn path_clear(board: &Board, from: Square, to: Square) -> bool {
        let step_file = (to.file as i8 - from.file as i8).signum();
        let step_rank = (to.rank as i8 - from.rank as i8).signum();

        let mut current = from;
        while let Some(next) = current.offset(step_file, step_rank) {
            if next == to {
                return true;
            }
            if board.is_occupied(next) {
                return false;
            }
            current = next;
        }
        false
    }

    /// 指定格子上 `side` 方的王是否受到攻击
    ///
    /// 遍历所有对方棋子，用无输出的合法性检查判断能否走到王的格子。
    pub fn is_king_attacked(board: &Board, king_square: Square, side: Side) -> bool {
        let attacker = side.opponent();
        board
            .pieces(attacker)
            .into_iter()
            .any(|(from, _)| Self::is_move_legal(board, &Move::new(from, king_square), attacker))
    }

    /// 指定阵营是否被将军
    ///
    /// 找不到王说明上游状态已损坏，记录诊断并视为未被将军。
    pub fn is_in_check(board: &Board, side: Side) -> bool {
        match board.find_king(side) {
            Some(king_square) => Self::is_king_attacked(board, king_square, side),
            None => {
                warn!("King not found on the board for {:?}", side);
                false
            }
        }
    }

    /// 生成指定阵营的所有合法走法（按本规则子集，不含升变后缀）
    pub fn legal_moves(board: &Board, side: Side) -> Vec<Move> {
        let mut moves = Vec::new();
        for (from, _) in board.pieces(side) {
            for to in Square::all() {
                if to == from {
                    continue;
                }
                let mv = Move::new(from, to);
                if Self::is_move_legal(board, &mv, side) {
                    moves.push(mv);
                }
            }
        }
        moves
    }

    /// 是否被将死
    ///
    /// 先要求当前被将军；再尝试己方每个棋子到 64 个格子的每个合法走法，
    /// 在棋盘副本上模拟后王仍被攻击才算将死。
    pub fn is_checkmate(board: &Board, side: Side) -> bool {
        if !Self::is_in_check(board, side) {
            return false;
        }

        for mv in Self::legal_moves(board, side) {
            let mut simulated = board.clone();
            if MoveExecutor::apply_to_board(&mut simulated, &mv).is_err() {
                continue;
            }
            if !Self::is_in_check(&simulated, side) {
                return false;
            }
        }

        true
    }
}
