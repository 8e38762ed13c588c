//! 错误类型定义

use thiserror::Error;

use crate::piece::{PieceType, Square};

/// 象棋规则错误
///
/// `Display` 文本即面向用户的拒绝原因。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChessError {
    /// 走法字符串长度或字符不合法
    #[error("Invalid move: '{input}' is not a move string")]
    MalformedMove { input: String },

    /// 坐标越界
    #[error("Invalid move: '{input}' is out of bounds")]
    OutOfBounds { input: String },

    /// 起点与终点相同
    #[error("Invalid move: source and destination are the same square {square}")]
    SameSquare { square: Square },

    /// 无效的升变字符
    #[error("Invalid promotion piece: '{letter}'")]
    InvalidPromotion { letter: char },

    /// 只有走到底线的兵可以升变
    #[error("Invalid move: Only a pawn reaching the last rank can promote, not the move to {square}.")]
    PromotionNotAllowed { square: Square },

    /// 起点没有棋子
    #[error("Invalid move: Source position {square} is empty.")]
    NoPiece { square: Square },

    /// 不是走子方的棋子
    #[error("Invalid move: Player cannot move the piece on {square}.")]
    NotYourPiece { square: Square },

    /// 终点被己方棋子占据
    #[error("Invalid move: Destination {square} is occupied by a friendly piece.")]
    FriendlyPiece { square: Square },

    /// 车只能直走
    #[error("Invalid move: Rook can only move horizontally or vertically.")]
    RookNotStraight,

    /// 象只能斜走
    #[error("Invalid move: Bishop can only move diagonally.")]
    BishopNotDiagonal,

    /// 后只能直走或斜走
    #[error("Invalid move: Queen must move like a rook or bishop.")]
    QueenNotLine,

    /// 马走日
    #[error("Invalid move: Knight must move in an L-shape.")]
    KnightNotL,

    /// 王只能走一步
    #[error("Invalid move: King can only move one square in any direction.")]
    KingTooFar,

    /// 路径被阻挡
    #[error("Invalid move: Path is blocked for the {piece_type:?}.")]
    PathBlocked { piece_type: PieceType },

    /// 兵只能向前
    #[error("Invalid move: Pawn can only move forward or capture diagonally.")]
    PawnBadStep,

    /// 兵斜走必须吃子
    #[error("Invalid move: Pawn can only capture diagonally.")]
    PawnCaptureOnly,

    /// 兵直走终点必须为空
    #[error("Invalid move: Pawn cannot capture straight ahead.")]
    PawnForwardBlocked,

    /// 兵只能从起始行走两步
    #[error("Invalid move: Pawn can only move two squares forward from its starting rank.")]
    PawnDoubleStep,

    /// 游戏已结束
    #[error("Game is already over")]
    GameOver,
}

/// 规则操作结果类型
pub type Result<T> = std::result::Result<T, ChessError>;
