//! 渲染端使用的棋子摆放表
//!
//! 每个实体棋子一条记录：所在格子和 3D 摆放参数。
//! 本库负责修改，渲染端只读。

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::constants::{BOARD_SIZE, PIECE_ROTATION_DEG, PIECE_SCALE, PLATFORM_HEIGHT, SQUARE_SIZE};
use crate::piece::{Piece, Side, Square};

/// 3D 摆放参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// 重复绘制次数
    pub rotation_count: u32,
    /// 重复绘制间隔（格数）
    pub rotation_spacing: u32,
    /// 旋转角度（度）
    pub rotation_angle: f32,
    /// 旋转轴
    pub rotation_axis: [f32; 3],
    /// 缩放
    pub scale: [f32; 3],
    /// 平移
    pub translation: [f32; 3],
}

impl Placement {
    /// 按列、行（1 起始，允许棋盘外的 0 和 9）计算棋子摆放
    pub fn at(file: u8, rank_number: u8) -> Self {
        let half = (BOARD_SIZE as f32 - 1.0) / 2.0;
        Self {
            rotation_count: 1,
            rotation_spacing: 0,
            rotation_angle: PIECE_ROTATION_DEG,
            rotation_axis: [1.0, 0.0, 0.0],
            scale: [PIECE_SCALE; 3],
            translation: [
                file as f32 * SQUARE_SIZE - half * SQUARE_SIZE,
                (rank_number as f32 - 1.0) * SQUARE_SIZE - half * SQUARE_SIZE,
                PLATFORM_HEIGHT,
            ],
        }
    }

    /// 棋盘格子上的摆放
    pub fn for_square(square: Square) -> Self {
        Self::at(square.file, square.rank + 1)
    }
}

/// 棋子所在位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    /// 棋盘上
    Board(Square),
    /// 被吃后停放在棋盘外（rank 为 1 起始行号，0 或 9）
    Holding { file: u8, rank: u8 },
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Board(square) => write!(f, "{}", square),
            Location::Holding { file, rank } => write!(f, "{}{}", (b'a' + file) as char, rank),
        }
    }
}

/// 一个实体棋子的位置记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub piece: Piece,
    pub location: Location,
    pub placement: Placement,
}

impl LocationEntry {
    pub fn on_board(piece: Piece, square: Square) -> Self {
        Self {
            piece,
            location: Location::Board(square),
            placement: Placement::for_square(square),
        }
    }

    pub fn square(&self) -> Option<Square> {
        match self.location {
            Location::Board(square) => Some(square),
            Location::Holding { .. } => None,
        }
    }
}

/// 每方被吃棋子计数，决定下一个停放列
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureCounters {
    pub white: u32,
    pub black: u32,
}

impl CaptureCounters {
    /// 取下一个停放位置并推进计数，列在 a..h 之间循环
    pub fn next_slot(&mut self, side: Side) -> Location {
        let counter = match side {
            Side::White => &mut self.white,
            Side::Black => &mut self.black,
        };
        let file = (*counter % BOARD_SIZE as u32) as u8;
        *counter += 1;
        Location::Holding {
            file,
            rank: side.holding_rank(),
        }
    }

    pub fn count(&self, side: Side) -> u32 {
        match side {
            Side::White => self.white,
            Side::Black => self.black,
        }
    }
}

/// 棋子摆放表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceLayout {
    entries: Vec<LocationEntry>,
    captured: CaptureCounters,
}

impl PieceLayout {
    /// 按棋盘生成摆放表
    pub fn from_board(board: &Board) -> Self {
        Self {
            entries: board
                .all_pieces()
                .into_iter()
                .map(|(square, piece)| LocationEntry::on_board(piece, square))
                .collect(),
            captured: CaptureCounters::default(),
        }
    }

    /// 初始局面的摆放表
    pub fn initial() -> Self {
        Self::from_board(&Board::initial())
    }

    pub fn entries(&self) -> &[LocationEntry] {
        &self.entries
    }

    pub fn captured(&self) -> CaptureCounters {
        self.captured
    }

    /// 查找棋盘格子上的记录
    pub fn entry_at(&self, square: Square) -> Option<&LocationEntry> {
        self.entries
            .iter()
            .find(|entry| entry.location == Location::Board(square))
    }

    /// 渲染端查询：格子上是哪个棋子
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.entry_at(square).map(|entry| entry.piece)
    }

    fn entry_at_mut(&mut self, square: Square) -> Option<&mut LocationEntry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.location == Location::Board(square))
    }

    /// 将格子上被吃的棋子移到棋盘外，返回停放位置
    pub fn park(&mut self, square: Square, side: Side) -> Option<Location> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.location == Location::Board(square))?;
        let slot = self.captured.next_slot(side);
        entry.location = slot;
        if let Location::Holding { file, rank } = slot {
            entry.placement = Placement::at(file, rank);
        }
        Some(slot)
    }

    /// 把 `from` 上的棋子移到 `to`，同时换成 `piece`（升变时类型会变）
    pub fn relocate(&mut self, from: Square, to: Square, piece: Piece) -> bool {
        match self.entry_at_mut(from) {
            Some(entry) => {
                entry.piece = piece;
                entry.location = Location::Board(to);
                entry.placement = Placement::for_square(to);
                true
            }
            None => false,
        }
    }
}

impl Default for PieceLayout {
    fn default() -> Self {
        Self::initial()
    }
}
