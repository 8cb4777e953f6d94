//! 文档处理器 - 编排层
//!
//! 长文本 → 分块 → 并行调度（校对 / 翻译）→ 用空行拼回

use std::sync::Arc;

use crate::config::Config;
use crate::infrastructure::ProgressReporter;
use crate::models::Language;
use crate::orchestrator::dispatcher::ParallelDispatcher;
use crate::services::ChatModel;
use crate::workflow::chunker::{chunk_text, PARAGRAPH_BOUNDARY};
use crate::workflow::{Proofreader, Translator};

/// 文档处理器
///
/// 校对和翻译共享同一个调度器，也就共享同一个限流器。
pub struct DocumentProcessor {
    dispatcher: ParallelDispatcher,
    proofreader: Arc<Proofreader>,
    translator: Arc<Translator>,
    max_chunk_size: usize,
}

impl DocumentProcessor {
    pub fn new(
        dispatcher: ParallelDispatcher,
        model: Arc<dyn ChatModel>,
        max_chunk_size: usize,
    ) -> Self {
        Self {
            dispatcher,
            proofreader: Arc::new(Proofreader::new(model.clone())),
            translator: Arc::new(Translator::new(model)),
            max_chunk_size,
        }
    }

    /// 按配置创建处理器
    pub fn from_config(
        config: &Config,
        model: Arc<dyn ChatModel>,
        progress: ProgressReporter,
    ) -> Self {
        Self::new(
            ParallelDispatcher::new(config, progress),
            model,
            config.max_chunk_size,
        )
    }

    pub fn dispatcher(&self) -> &ParallelDispatcher {
        &self.dispatcher
    }

    /// 校对整段文本
    ///
    /// 校对失败的块保留原文，因此总能返回结果。
    pub async fn proofread(&self, text: &str, language: &Language, job_id: Option<&str>) -> String {
        let chunks = chunk_text(text, self.max_chunk_size);
        let proofreader = self.proofreader.clone();
        let language = language.clone();

        let results = self
            .dispatcher
            .process_parallel(
                chunks,
                move |chunk: String| {
                    let proofreader = proofreader.clone();
                    let language = language.clone();
                    async move { proofreader.proofread_chunk(&chunk, &language).await }
                },
                job_id,
                "Proofreading",
            )
            .await;

        results.join(PARAGRAPH_BOUNDARY)
    }

    /// 翻译整段文本
    ///
    /// 翻译失败的块保留原文。
    pub async fn translate(
        &self,
        text: &str,
        source: &Language,
        target: &Language,
        job_id: Option<&str>,
    ) -> String {
        let chunks = chunk_text(text, self.max_chunk_size);
        let translator = self.translator.clone();
        let (source, target) = (source.clone(), target.clone());

        let results = self
            .dispatcher
            .process_parallel(
                chunks,
                move |chunk: String| {
                    let translator = translator.clone();
                    let source = source.clone();
                    let target = target.clone();
                    async move { translator.translate_chunk(&chunk, &source, &target).await }
                },
                job_id,
                "Translating",
            )
            .await;

        results.join(PARAGRAPH_BOUNDARY)
    }
}
