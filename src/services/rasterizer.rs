//! 光栅化能力
//!
//! PDF 渲染库由调用方提供，这里只定义 OCR 流水线需要的接口。

use crate::models::PageImage;
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// 把文档逐页渲染为 PNG 图片
///
/// 失败视为致命错误：渲染不出页面，OCR 任务无法开始。
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// 文档总页数
    async fn page_count(&self, path: &Path) -> Result<usize>;

    /// 渲染指定页（从 0 开始）
    async fn render_page(&self, path: &Path, index: usize, dpi: u32) -> Result<PageImage>;
}
