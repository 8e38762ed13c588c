//! 按行缓冲
//!
//! 管道读取可能在一行中间截断，任何标记都不能跨两次读取匹配。
//! 每次读取后在最后一个换行处切开：之前的部分（含换行）作为完整块返回，
//! 之后的部分留作残余，与下一次读取拼接。

/// 行缓冲器
#[derive(Debug, Default, Clone)]
pub struct LineBuffer {
    residual: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一次读取的数据，返回以换行结尾的完整块（没有换行时为空）
    pub fn feed(&mut self, bytes: &[u8]) -> String {
        self.residual.extend_from_slice(bytes);

        match self.residual.iter().rposition(|&b| b == b'\n') {
            Some(pos) => {
                let rest = self.residual.split_off(pos + 1);
                let complete = std::mem::replace(&mut self.residual, rest);
                String::from_utf8_lossy(&complete).into_owned()
            }
            None => String::new(),
        }
    }

    /// 输入结束：残余部分作为最后一块返回
    pub fn finish(&mut self) -> String {
        let rest = std::mem::take(&mut self.residual);
        String::from_utf8_lossy(&rest).into_owned()
    }

    /// 当前残余（未以换行结尾的部分）
    pub fn residual(&self) -> &[u8] {
        &self.residual
    }

    pub fn is_empty(&self) -> bool {
        self.residual.is_empty()
    }

    pub fn clear(&mut self) {
        self.residual.clear();
    }
}
