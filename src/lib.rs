//! # Doc Pipeline
//!
//! 面向印度系文字扫描文档的并行处理引擎：OCR、校对、翻译
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有被所有 worker 共享的资源，只暴露能力
//! - `RateLimiter` - 全局请求节奏控制
//! - `ProgressReporter` - 按任务 ID 上报进度（存储可注入）
//! - `WorkerPool` - 有界并发执行
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个请求
//! - `LlmService` - 大模型对话能力（`ChatModel`）
//! - `VisionService` - 图片文字识别能力（`TextRecognizer`）
//! - `Rasterizer` - 文档光栅化能力，由调用方实现
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个文本块"的处理流程
//! - `chunk_text` - 按段落 / 句子边界分块
//! - `Proofreader` - 校对单个文本块
//! - `Translator` - 翻译单个文本块
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/dispatcher` - 并行调度、限流、重试、回退、进度
//! - `orchestrator/document_processor` - 整段文本的校对和翻译
//! - `orchestrator/ocr_pipeline` - 整份文档的 OCR
//! - `orchestrator/app` - 应用入口和完整流水线
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, ConfigError, UnitError};
pub use infrastructure::{InMemoryProgressStore, ProgressReporter, ProgressStore, RateLimiter};
pub use models::{Language, PageImage, ProgressSnapshot, Unit};
pub use orchestrator::{
    App, DocumentProcessor, OcrPipeline, ParallelDispatcher, PipelineOutput, PipelineRequest,
    RetryPolicy,
};
pub use services::{ChatModel, Rasterizer, TextRecognizer};
pub use workflow::chunk_text;
