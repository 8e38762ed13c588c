//! 棋子与格子定义

use serde::{Deserialize, Serialize};

use crate::constants::{
    BLACK_HOLDING_RANK, BLACK_PAWN_RANK, BOARD_SIZE, WHITE_HOLDING_RANK, WHITE_PAWN_RANK,
};

/// 棋子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    Pawn,
    Rook,
    Bishop,
    Knight,
    Queen,
    King,
}

impl PieceType {
    /// 获取 FEN 字符（白方大写，黑方小写）
    pub fn to_fen_char(&self, side: Side) -> char {
        let c = match self {
            PieceType::Pawn => 'p',
            PieceType::Rook => 'r',
            PieceType::Bishop => 'b',
            PieceType::Knight => 'n',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        };
        match side {
            Side::White => c.to_ascii_uppercase(),
            Side::Black => c,
        }
    }

    /// 从升变字符解析（q/r/b/n）
    pub fn from_promotion_char(c: char) -> Option<PieceType> {
        match c {
            'q' => Some(PieceType::Queen),
            'r' => Some(PieceType::Rook),
            'b' => Some(PieceType::Bishop),
            'n' => Some(PieceType::Knight),
            _ => None,
        }
    }

    /// 升变字符，非升变目标返回 None
    pub fn promotion_char(&self) -> Option<char> {
        match self {
            PieceType::Queen => Some('q'),
            PieceType::Rook => Some('r'),
            PieceType::Bishop => Some('b'),
            PieceType::Knight => Some('n'),
            PieceType::Pawn | PieceType::King => None,
        }
    }
}

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// 白方（玩家，先手，在 1、2 行）
    White,
    /// 黑方（外部引擎，后手，在 7、8 行）
    Black,
}

impl Side {
    /// 获取对方阵营
    pub fn opponent(&self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// 兵前进方向（行增量）
    pub fn forward(&self) -> i8 {
        match self {
            Side::White => 1,
            Side::Black => -1,
        }
    }

    /// 兵的起始行
    pub fn pawn_rank(&self) -> u8 {
        match self {
            Side::White => WHITE_PAWN_RANK,
            Side::Black => BLACK_PAWN_RANK,
        }
    }

    /// 兵的升变行（对方底线）
    pub fn last_rank(&self) -> u8 {
        match self {
            Side::White => BOARD_SIZE as u8 - 1,
            Side::Black => 0,
        }
    }

    /// 该方被吃棋子的停放行
    pub fn holding_rank(&self) -> u8 {
        match self {
            Side::White => WHITE_HOLDING_RANK,
            Side::Black => BLACK_HOLDING_RANK,
        }
    }
}

/// 棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub piece_type: PieceType,
    pub side: Side,
}

impl Piece {
    /// 创建新棋子
    pub fn new(piece_type: PieceType, side: Side) -> Self {
        Self { piece_type, side }
    }

    /// 获取 FEN 字符
    pub fn to_fen_char(&self) -> char {
        self.piece_type.to_fen_char(self.side)
    }

    pub fn is_king(&self) -> bool {
        self.piece_type == PieceType::King
    }
}

/// 棋盘格子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    /// 列 (0-7，对应 a-h)
    pub file: u8,
    /// 行 (0-7，对应 1-8)
    pub rank: u8,
}

impl Square {
    /// 创建新格子
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        if (file as usize) < BOARD_SIZE && (rank as usize) < BOARD_SIZE {
            Some(Self { file, rank })
        } else {
            None
        }
    }

    /// 创建新格子（不检查边界，内部使用）
    pub const fn new_unchecked(file: u8, rank: u8) -> Self {
        Self { file, rank }
    }

    /// 从两个坐标字符解析，两个维度都要检查边界
    pub fn from_chars(file: char, rank: char) -> Option<Self> {
        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        Some(Self {
            file: file as u8 - b'a',
            rank: rank as u8 - b'1',
        })
    }

    /// 从 "e4" 形式的字符串解析
    pub fn parse(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => Self::from_chars(file, rank),
            _ => None,
        }
    }

    /// 获取偏移后的格子
    pub fn offset(&self, df: i8, dr: i8) -> Option<Square> {
        let file = self.file as i8 + df;
        let rank = self.rank as i8 + dr;
        if file >= 0 && (file as usize) < BOARD_SIZE && rank >= 0 && (rank as usize) < BOARD_SIZE {
            Some(Square {
                file: file as u8,
                rank: rank as u8,
            })
        } else {
            None
        }
    }

    /// 转换为数组索引
    pub fn to_index(&self) -> usize {
        self.rank as usize * BOARD_SIZE + self.file as usize
    }

    /// 从数组索引转换
    pub fn from_index(index: usize) -> Option<Self> {
        if index < BOARD_SIZE * BOARD_SIZE {
            Some(Square {
                file: (index % BOARD_SIZE) as u8,
                rank: (index / BOARD_SIZE) as u8,
            })
        } else {
            None
        }
    }

    /// 所有 64 个格子，a1, b1, ..., h8
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE * BOARD_SIZE).map(|i| Square {
            file: (i % BOARD_SIZE) as u8,
            rank: (i / BOARD_SIZE) as u8,
        })
    }

    pub fn file_char(&self) -> char {
        (b'a' + self.file) as char
    }

    pub fn rank_char(&self) -> char {
        (b'1' + self.rank) as char
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}
