//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责并行调度和流程串联，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `dispatcher` - 并行调度器
//! - 有界并发处理一组单元（文本块 / 页面）
//! - 共享限流器控制请求节奏
//! - 限流错误延迟重试，其余失败回退为原始单元
//! - 按任务 ID 上报进度
//!
//! ### `document_processor` - 文档处理器
//! - 分块 → 调度校对或翻译 → 拼回
//!
//! ### `ocr_pipeline` - OCR 流水线
//! - 逐页光栅化，并行识别，按页码拼接
//!
//! ### `app` - 应用入口
//! - 组装服务，提供单项操作和完整流水线
//!
//! ## 层次关系
//!
//! ```text
//! app (PipelineRequest)
//!     ↓
//! document_processor / ocr_pipeline
//!     ↓
//! dispatcher (Vec<Unit>)
//!     ↓
//! workflow (Proofreader / Translator，处理单个文本块)
//!     ↓
//! services (能力层：ChatModel / TextRecognizer / Rasterizer)
//!     ↓
//! infrastructure (基础设施：RateLimiter / ProgressReporter / WorkerPool)
//! ```
//!
//! ## 设计原则
//!
//! 1. **结果有序**：输出顺序只由输入顺序决定
//! 2. **失败隔离**：单个单元失败不影响其他单元
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure

pub mod app;
pub mod dispatcher;
pub mod document_processor;
pub mod ocr_pipeline;

// 重新导出主要类型
pub use app::{App, PipelineOutput, PipelineRequest};
pub use dispatcher::{ParallelDispatcher, RetryPolicy};
pub use document_processor::DocumentProcessor;
pub use ocr_pipeline::{assemble_pages, OcrPipeline};
