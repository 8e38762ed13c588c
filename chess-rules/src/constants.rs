//! 规则与布局常量

/// 棋盘边长（列数 = 行数）
pub const BOARD_SIZE: usize = 8;

/// 白方（玩家）兵的起始行，0 起始
pub const WHITE_PAWN_RANK: u8 = 1;

/// 黑方（引擎）兵的起始行，0 起始
pub const BLACK_PAWN_RANK: u8 = 6;

/// 被吃的白方棋子停放行（棋盘外，1 起始记法中的第 9 行）
pub const WHITE_HOLDING_RANK: u8 = 9;

/// 被吃的黑方棋子停放行（棋盘外，1 起始记法中的第 0 行）
pub const BLACK_HOLDING_RANK: u8 = 0;

/// 棋盘模型缩放
pub const BOARD_SCALE: f32 = 0.6;

/// 每个格子的边长（场景单位）
pub const SQUARE_SIZE: f32 = BOARD_SCALE * 5.4;

/// 棋子模型缩放
pub const PIECE_SCALE: f32 = 0.015;

/// 棋盘平台高度
pub const PLATFORM_HEIGHT: f32 = -3.0;

/// 棋子模型绕 X 轴的旋转角度（度）
pub const PIECE_ROTATION_DEG: f32 = 90.0;
