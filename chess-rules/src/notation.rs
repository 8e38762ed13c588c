//! 走法记法
//!
//! 坐标记法：`[a-h][1-8][a-h][1-8]`，可选第 5 个升变字符 `q|r|b|n`。
//! 与外部引擎交换的就是这种字符串。

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChessError, Result};
use crate::piece::{PieceType, Square};

/// 走法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// 起始格
    pub from: Square,
    /// 目标格
    pub to: Square,
    /// 升变后的棋子类型
    pub promotion: Option<PieceType>,
}

impl Move {
    /// 创建新走法
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    /// 创建升变走法
    pub fn with_promotion(from: Square, to: Square, promotion: PieceType) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    /// 解析走法字符串
    ///
    /// 先检查长度，再检查两个格子的边界，最后检查升变字符。
    pub fn parse(text: &str) -> Result<Move> {
        let chars: Vec<char> = text.chars().collect();
        if chars.len() != 4 && chars.len() != 5 {
            return Err(ChessError::MalformedMove {
                input: text.to_string(),
            });
        }

        let from = Square::from_chars(chars[0], chars[1]);
        let to = Square::from_chars(chars[2], chars[3]);
        let (from, to) = match (from, to) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                return Err(ChessError::OutOfBounds {
                    input: text.to_string(),
                })
            }
        };

        if from == to {
            return Err(ChessError::SameSquare { square: from });
        }

        let promotion = match chars.get(4) {
            Some(&letter) => Some(
                PieceType::from_promotion_char(letter)
                    .ok_or(ChessError::InvalidPromotion { letter })?,
            ),
            None => None,
        };

        Ok(Move { from, to, promotion })
    }

    /// 文件差、行差（有符号）
    pub fn delta(&self) -> (i8, i8) {
        (
            self.to.file as i8 - self.from.file as i8,
            self.to.rank as i8 - self.from.rank as i8,
        )
    }
}

impl FromStr for Move {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self> {
        Move::parse(s)
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(c) = self.promotion.and_then(|p| p.promotion_char()) {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// 走法历史
///
/// 正常对局中只追加；引擎失败时由会话整体回滚。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveHistory {
    moves: Vec<Move>,
}

impl MoveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn last(&self) -> Option<&Move> {
        self.moves.last()
    }

    /// 每步的走法字符串
    pub fn to_strings(&self) -> Vec<String> {
        self.moves.iter().map(Move::to_string).collect()
    }

    /// 空格分隔的完整历史，用于 `position startpos moves ...`
    pub fn joined(&self) -> String {
        self.to_strings().join(" ")
    }
}

impl std::fmt::Display for MoveHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.joined())
    }
}
