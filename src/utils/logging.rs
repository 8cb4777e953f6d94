//! 日志工具模块
//!
//! 提供日志初始化、任务横幅和文本截断等辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则默认 `info`。可以重复调用。
pub fn init() {
    init_with_verbosity(false);
}

/// 初始化日志，`verbose` 为真时默认级别为 `debug`
pub fn init_with_verbosity(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 单个任务的处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JobStats {
    /// 成功处理的单元数
    pub processed: usize,
    /// 回退为原始内容的单元数
    pub fallback: usize,
    pub total: usize,
}

/// 记录启动信息
///
/// # 参数
/// - `max_workers`: 文本块并发数
/// - `ocr_workers`: OCR 页面并发数
pub fn log_startup(max_workers: usize, ocr_workers: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 文档处理流水线启动");
    info!("📊 文本并发数: {} | OCR 并发数: {}", max_workers, ocr_workers);
    info!("{}", "=".repeat(60));
}

/// 记录任务开始信息
///
/// # 参数
/// - `operation`: 操作名称
/// - `job_id`: 任务 ID（可选）
/// - `units`: 单元总数
/// - `workers`: 并发数
pub fn log_job_start(operation: &str, job_id: Option<&str>, units: usize, workers: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 {} 开始 [任务 {}]", operation, job_id.unwrap_or("-"));
    info!("📄 共 {} 个单元，并发数 {}", units, workers);
    info!("{}", "=".repeat(60));
}

/// 记录任务完成信息
pub fn log_job_complete(operation: &str, job_id: Option<&str>, stats: &JobStats) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ {} 完成 [任务 {}] - {}",
        operation,
        job_id.unwrap_or("-"),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ 成功: {}/{}", stats.processed, stats.total);
    if stats.fallback > 0 {
        info!("⚠️ 保留原文: {}", stats.fallback);
    }
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
