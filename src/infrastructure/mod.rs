//! 基础设施层（Infrastructure）
//!
//! 持有被所有 worker 共享的资源，只暴露能力：
//! - `RateLimiter` - 全局请求节奏控制
//! - `ProgressReporter` - 按任务 ID 上报进度
//! - `WorkerPool` - 有界并发执行，按索引回收结果

pub mod progress;
pub mod rate_limiter;
pub mod worker_pool;

pub use progress::{InMemoryProgressStore, ProgressReporter, ProgressStore};
pub use rate_limiter::RateLimiter;
pub use worker_pool::WorkerPool;
