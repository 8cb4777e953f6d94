//! OCR 页面流水线 - 编排层
//!
//! 文档 → 逐页光栅化 → 并行识别 → 按页码顺序拼接
//!
//! 光栅化失败是致命错误；单页识别失败只会让该页为空，不影响其他页。

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{ProgressReporter, WorkerPool};
use crate::models::PageImage;
use crate::services::{Rasterizer, TextRecognizer};
use crate::workflow::chunker::PARAGRAPH_BOUNDARY;

/// 默认并发识别的页数
const DEFAULT_OCR_WORKERS: usize = 5;

/// 默认渲染分辨率
const DEFAULT_DPI: u32 = 200;

/// OCR 流水线
pub struct OcrPipeline {
    rasterizer: Arc<dyn Rasterizer>,
    recognizer: Arc<dyn TextRecognizer>,
    progress: ProgressReporter,
    workers: usize,
    dpi: u32,
}

impl OcrPipeline {
    pub fn new(
        rasterizer: Arc<dyn Rasterizer>,
        recognizer: Arc<dyn TextRecognizer>,
        progress: ProgressReporter,
    ) -> Self {
        Self {
            rasterizer,
            recognizer,
            progress,
            workers: DEFAULT_OCR_WORKERS,
            dpi: DEFAULT_DPI,
        }
    }

    /// 按配置创建流水线
    pub fn from_config(
        config: &Config,
        rasterizer: Arc<dyn Rasterizer>,
        recognizer: Arc<dyn TextRecognizer>,
        progress: ProgressReporter,
    ) -> Self {
        Self::new(rasterizer, recognizer, progress)
            .with_workers(config.ocr_workers)
            .with_dpi(config.ocr_dpi)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// 对整份文档执行 OCR
    ///
    /// # 返回
    /// 所有非空页面文字按页码顺序用空行连接；没有任何文字时为空字符串。
    pub async fn perform_ocr(&self, path: &Path, job_id: Option<&str>) -> AppResult<String> {
        info!("📄 开始 OCR: {}", path.display());

        let pages = self.rasterize(path, job_id).await?;
        let texts = self.extract_pages(pages, job_id).await;
        let recognized = texts.iter().filter(|t| !t.is_empty()).count();

        info!("✓ OCR 完成: {}/{} 页识别到文字", recognized, texts.len());
        Ok(assemble_pages(&texts))
    }

    /// 逐页光栅化
    ///
    /// 每渲染一页上报一次 `"Converting page i/n"`。
    pub async fn rasterize(&self, path: &Path, job_id: Option<&str>) -> AppResult<Vec<PageImage>> {
        let display = path.display().to_string();

        let total = self
            .rasterizer
            .page_count(path)
            .await
            .map_err(|e| AppError::rasterize_failed(&display, e))?;

        debug!("文档共 {} 页，分辨率 {} DPI", total, self.dpi);

        let mut pages = Vec::with_capacity(total);
        for index in 0..total {
            self.progress.report(
                job_id,
                index + 1,
                total,
                format!("Converting page {}/{}", index + 1, total),
            );

            let page = self
                .rasterizer
                .render_page(path, index, self.dpi)
                .await
                .map_err(|e| AppError::rasterize_failed(&display, e))?;
            pages.push(page);
        }

        Ok(pages)
    }

    /// 并行识别所有页面
    ///
    /// 返回与输入等长的文字列表，识别失败或没有文字的页面为空字符串。
    pub async fn extract_pages(&self, pages: Vec<PageImage>, job_id: Option<&str>) -> Vec<String> {
        let total = pages.len();
        let mut texts = vec![String::new(); total];

        let recognizer = self.recognizer.clone();
        let progress = self.progress.clone();
        let job_id_owned = job_id.map(str::to_string);

        WorkerPool::new(self.workers)
            .run(
                pages,
                move |index, page| {
                    let recognizer = recognizer.clone();
                    let progress = progress.clone();
                    let job_id = job_id_owned.clone();
                    async move {
                        progress.report(
                            job_id.as_deref(),
                            index + 1,
                            total,
                            format!("Extracting text from page {}/{}", index + 1, total),
                        );
                        extract_page(recognizer.as_ref(), index, &page).await
                    }
                },
                |index, outcome| match outcome {
                    Ok(text) => texts[index] = text,
                    Err(e) => warn!("[页面 {}] 识别任务异常终止: {}", index + 1, e),
                },
            )
            .await;

        texts
    }
}

async fn extract_page(recognizer: &dyn TextRecognizer, index: usize, page: &PageImage) -> String {
    match recognizer.recognize(&page.to_base64()).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            debug!("[页面 {}] 未识别到文字", index + 1);
            String::new()
        }
        Err(e) => {
            warn!("[页面 {}] 识别失败: {}", index + 1, e);
            String::new()
        }
    }
}

/// 按页码顺序拼接非空页面
pub fn assemble_pages(texts: &[String]) -> String {
    texts
        .iter()
        .filter(|text| !text.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(PARAGRAPH_BOUNDARY)
}
