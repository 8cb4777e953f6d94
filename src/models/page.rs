use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::sync::Arc;

/// 光栅化后的单页图片（PNG 编码）
///
/// 字节内容放在 `Arc` 中，克隆时不复制图片数据。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// 页码（从 0 开始）
    pub index: usize,
    png: Arc<[u8]>,
}

impl PageImage {
    pub fn new(index: usize, png: impl Into<Vec<u8>>) -> Self {
        Self {
            index,
            png: Arc::from(png.into()),
        }
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    /// 编码为可传输的 base64 字符串
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.png)
    }
}
