//! 棋盘状态

use serde::{Deserialize, Serialize};

use crate::constants::BOARD_SIZE;
use crate::piece::{Piece, PieceType, Side, Square};

/// 后排棋子顺序（a 列到 h 列）
const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// 棋盘：格子到棋子的映射，占用情况的唯一来源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// 8x8 棋盘，索引为 rank * 8 + file，使用 Vec 以支持 serde
    squares: Vec<Option<Piece>>,
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            squares: vec![None; BOARD_SIZE * BOARD_SIZE],
        }
    }

    /// 创建初始棋盘
    pub fn initial() -> Self {
        let mut board = Self::empty();

        for (file, piece_type) in BACK_RANK.iter().enumerate() {
            let file = file as u8;
            board.set(Square::new_unchecked(file, 0), Some(Piece::new(*piece_type, Side::White)));
            board.set(Square::new_unchecked(file, 1), Some(Piece::new(PieceType::Pawn, Side::White)));
            board.set(Square::new_unchecked(file, 6), Some(Piece::new(PieceType::Pawn, Side::Black)));
            board.set(Square::new_unchecked(file, 7), Some(Piece::new(*piece_type, Side::Black)));
        }

        board
    }

    /// 获取指定格子的棋子
    pub fn get(&self, square: Square) -> Option<Piece> {
        self.squares.get(square.to_index()).copied().flatten()
    }

    /// 设置指定格子的棋子
    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        if let Some(slot) = self.squares.get_mut(square.to_index()) {
            *slot = piece;
        }
    }

    /// 移除并返回指定格子的棋子
    pub fn remove(&mut self, square: Square) -> Option<Piece> {
        self.squares.get_mut(square.to_index()).and_then(Option::take)
    }

    pub fn is_occupied(&self, square: Square) -> bool {
        self.get(square).is_some()
    }

    /// 移动棋子（不检查规则），返回被吃的棋子
    pub fn move_piece(&mut self, from: Square, to: Square) -> Option<Piece> {
        let piece = self.remove(from);
        let captured = self.remove(to);
        self.set(to, piece);
        captured
    }

    /// 查找指定阵营的王
    pub fn find_king(&self, side: Side) -> Option<Square> {
        self.all_pieces()
            .into_iter()
            .find(|(_, piece)| piece.is_king() && piece.side == side)
            .map(|(square, _)| square)
    }

    /// 获取指定阵营的所有棋子
    pub fn pieces(&self, side: Side) -> Vec<(Square, Piece)> {
        self.all_pieces()
            .into_iter()
            .filter(|(_, piece)| piece.side == side)
            .collect()
    }

    /// 获取所有棋子，按 a1..h8 顺序
    pub fn all_pieces(&self) -> Vec<(Square, Piece)> {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let piece = (*slot)?;
                Square::from_index(index).map(|square| (square, piece))
            })
            .collect()
    }

    /// 棋子数量
    pub fn piece_count(&self) -> usize {
        self.squares.iter().filter(|slot| slot.is_some()).count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rank in (0..BOARD_SIZE as u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..BOARD_SIZE as u8 {
                let c = self
                    .get(Square::new_unchecked(file, rank))
                    .map(|piece| piece.to_fen_char())
                    .unwrap_or('.');
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "  abcdefgh")
    }
}
