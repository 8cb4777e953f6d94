//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 本模块把各层组装成一个可直接调用的应用对象。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、创建模型和识别服务、输出启动信息
//! 2. **单项操作**：校对、翻译、OCR，各自带可选的任务 ID
//! 3. **完整流水线**：OCR → 校对（可选）→ 翻译（可选）
//! 4. **进度查询**：按任务 ID 读取和清理进度快照
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个文本块或页面的细节
//! - **依赖注入**：模型、识别服务、光栅化器和进度存储都可以替换

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{ProgressReporter, ProgressStore};
use crate::models::{Language, ProgressSnapshot};
use crate::orchestrator::document_processor::DocumentProcessor;
use crate::orchestrator::ocr_pipeline::OcrPipeline;
use crate::services::{ChatModel, LlmService, Rasterizer, TextRecognizer, VisionService};
use crate::utils::logging::{init_with_verbosity, log_startup};

/// 应用主结构
pub struct App {
    config: Config,
    progress: ProgressReporter,
    documents: DocumentProcessor,
    ocr: OcrPipeline,
}

impl App {
    /// 初始化应用
    ///
    /// 使用真实的模型和 Vision 服务，缺少任一 API 密钥时失败。
    pub fn initialize(config: Config, rasterizer: Arc<dyn Rasterizer>) -> AppResult<Self> {
        init_with_verbosity(config.verbose_logging);
        config.validate()?;

        let chat_model = Arc::new(LlmService::new(&config)?);
        let recognizer = Arc::new(VisionService::new(&config)?);

        Self::with_services(config, chat_model, recognizer, rasterizer)
    }

    /// 使用给定的服务组装应用，进度保存在内存中
    pub fn with_services(
        config: Config,
        chat_model: Arc<dyn ChatModel>,
        recognizer: Arc<dyn TextRecognizer>,
        rasterizer: Arc<dyn Rasterizer>,
    ) -> AppResult<Self> {
        Self::with_progress(
            config,
            chat_model,
            recognizer,
            rasterizer,
            ProgressReporter::in_memory(),
        )
    }

    /// 使用给定的服务和进度上报器组装应用
    pub fn with_progress(
        config: Config,
        chat_model: Arc<dyn ChatModel>,
        recognizer: Arc<dyn TextRecognizer>,
        rasterizer: Arc<dyn Rasterizer>,
        progress: ProgressReporter,
    ) -> AppResult<Self> {
        config.validate()?;
        log_startup(config.max_workers, config.ocr_workers);

        let documents = DocumentProcessor::from_config(&config, chat_model, progress.clone());
        let ocr = OcrPipeline::from_config(&config, rasterizer, recognizer, progress.clone());

        Ok(Self {
            config,
            progress,
            documents,
            ocr,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 底层进度存储，供外部服务层共享
    pub fn progress_store(&self) -> Arc<dyn ProgressStore> {
        self.progress.store()
    }

    /// 校对文本，失败的块保留原文
    pub async fn proofread(&self, text: &str, language: &Language, job_id: Option<&str>) -> String {
        self.documents.proofread(text, language, job_id).await
    }

    /// 翻译文本，失败的块保留原文
    pub async fn translate(
        &self,
        text: &str,
        source: &Language,
        target: &Language,
        job_id: Option<&str>,
    ) -> String {
        self.documents.translate(text, source, target, job_id).await
    }

    /// 对文档执行 OCR
    pub async fn perform_ocr(&self, path: &Path, job_id: Option<&str>) -> AppResult<String> {
        self.ocr.perform_ocr(path, job_id).await
    }

    /// 查询任务进度
    pub fn progress(&self, job_id: &str) -> Option<ProgressSnapshot> {
        self.progress.snapshot(job_id)
    }

    /// 清理任务进度
    pub fn clear_progress(&self, job_id: &str) {
        self.progress.clear(job_id);
    }

    /// 运行完整流水线
    ///
    /// 只有 OCR 的光栅化失败会中断流水线；校对和翻译总能产出结果。
    pub async fn run_pipeline(&self, request: &PipelineRequest) -> AppResult<PipelineOutput> {
        let job_id = request.job_id.as_deref();

        info!("\n{}", "=".repeat(60));
        info!("🚀 流水线开始: {}", request.path.display());
        info!("{}", "=".repeat(60));

        let extracted = self.perform_ocr(&request.path, job_id).await?;

        let proofread = if request.proofread {
            Some(self.proofread(&extracted, &request.language, job_id).await)
        } else {
            None
        };

        let translated = match &request.translate_to {
            Some(target) => {
                let source_text = proofread.as_deref().unwrap_or(&extracted);
                Some(
                    self.translate(source_text, &request.language, target, job_id)
                        .await,
                )
            }
            None => None,
        };

        info!("✓ 流水线完成: {}", request.path.display());

        Ok(PipelineOutput {
            extracted,
            proofread,
            translated,
        })
    }
}

/// 流水线请求
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    /// 待处理的文档
    pub path: PathBuf,
    /// 文档语言
    pub language: Language,
    /// 是否校对 OCR 结果
    pub proofread: bool,
    /// 翻译目标语言，`None` 表示不翻译
    pub translate_to: Option<Language>,
    pub job_id: Option<String>,
}

impl PipelineRequest {
    /// 只做 OCR 的请求
    pub fn new(path: impl Into<PathBuf>, language: Language) -> Self {
        Self {
            path: path.into(),
            language,
            proofread: false,
            translate_to: None,
            job_id: None,
        }
    }

    pub fn with_proofreading(mut self) -> Self {
        self.proofread = true;
        self
    }

    pub fn with_translation(mut self, target: Language) -> Self {
        self.translate_to = Some(target);
        self
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }
}

/// 流水线输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    /// OCR 原始结果
    pub extracted: String,
    pub proofread: Option<String>,
    pub translated: Option<String>,
}

impl PipelineOutput {
    /// 流水线最后一步的结果
    pub fn final_text(&self) -> &str {
        self.translated
            .as_deref()
            .or(self.proofread.as_deref())
            .unwrap_or(&self.extracted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = PipelineRequest::new("book.pdf", Language::Gujarati)
            .with_proofreading()
            .with_translation(Language::English)
            .with_job_id("job-1");

        assert_eq!(request.path, PathBuf::from("book.pdf"));
        assert!(request.proofread);
        assert_eq!(request.translate_to, Some(Language::English));
        assert_eq!(request.job_id.as_deref(), Some("job-1"));
    }

    #[test]
    fn test_final_text() {
        let mut output = PipelineOutput {
            extracted: "raw".to_string(),
            proofread: None,
            translated: None,
        };
        assert_eq!(output.final_text(), "raw");

        output.proofread = Some("clean".to_string());
        assert_eq!(output.final_text(), "clean");

        output.translated = Some("translated".to_string());
        assert_eq!(output.final_text(), "translated");
    }

    #[test]
    fn test_initialize_requires_keys() {
        struct NoRasterizer;

        #[async_trait::async_trait]
        impl Rasterizer for NoRasterizer {
            async fn page_count(&self, _path: &Path) -> anyhow::Result<usize> {
                Ok(0)
            }

            async fn render_page(
                &self,
                _path: &Path,
                _index: usize,
                _dpi: u32,
            ) -> anyhow::Result<crate::models::PageImage> {
                anyhow::bail!("no pages")
            }
        }

        assert!(App::initialize(Config::default(), Arc::new(NoRasterizer)).is_err());
    }
}
