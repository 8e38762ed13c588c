//! 引擎应答解析

/// 最佳走法标记
pub const BEST_MOVE_TOKEN: &str = "bestmove";

/// 引擎拒绝执行走法时的输出
pub const REJECTED_TOKEN: &str = "Cannot execute move";

/// 引擎拒绝时使用的占位走法
pub const FALLBACK_MOVE: &str = "a1g1";

/// 一个完整块的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkReply {
    /// 引擎无法执行走法
    Rejected,
    /// 找到长度合法的走法
    BestMove(String),
    /// 找到 bestmove 但后面的走法长度不是 4 或 5
    Malformed(String),
    /// 其它输出（info 等）
    Chatter,
}

/// 扫描一个完整块
///
/// 拒绝标记优先于 bestmove。
pub fn scan_chunk(chunk: &str) -> ChunkReply {
    if chunk.contains(REJECTED_TOKEN) {
        return ChunkReply::Rejected;
    }

    match extract_best_move(chunk) {
        Some(mv) if matches!(mv.chars().count(), 4 | 5) => ChunkReply::BestMove(mv),
        Some(raw) => ChunkReply::Malformed(raw),
        None => ChunkReply::Chatter,
    }
}

/// 取出 `bestmove` 后面的走法
///
/// 从标记后第 9 个字符（跳过一个分隔空格）开始，到第一个空白字符为止。
pub fn extract_best_move(chunk: &str) -> Option<String> {
    let pos = chunk.find(BEST_MOVE_TOKEN)?;
    let rest = chunk.get(pos + BEST_MOVE_TOKEN.len() + 1..).unwrap_or("");
    let end = rest
        .find(|c: char| c.is_ascii_whitespace())
        .unwrap_or(rest.len());
    Some(rest[..end].to_string())
}
