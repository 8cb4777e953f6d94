//! 并行调度器 - 编排层
//!
//! ## 职责
//!
//! 把一个有序的单元列表交给有界 worker 池处理，并保证：
//!
//! 1. **顺序不变**：结果按原始索引放回，与完成顺序无关
//! 2. **节奏受控**：每次调用前都经过同一个 `RateLimiter`
//! 3. **限流重试**：`Transient` 错误按 `RetryPolicy` 延迟重试
//! 4. **优雅降级**：任何失败或空结果都回退为原始单元，不中断其他单元
//! 5. **进度上报**：每完成一个单元上报一次 `"{操作}: {完成数}/{总数}"`

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::UnitError;
use crate::infrastructure::{ProgressReporter, RateLimiter, WorkerPool};
use crate::models::Unit;
use crate::utils::logging::{log_job_complete, log_job_start, JobStats};

/// 限流重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// `Transient` 错误的最大重试次数
    pub max_retries: usize,
    /// 每次重试前的固定等待时间
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// 不重试
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1, Duration::from_secs(5))
    }
}

/// 并行调度器
pub struct ParallelDispatcher {
    max_workers: usize,
    rate_limiter: Arc<RateLimiter>,
    retry_policy: RetryPolicy,
    call_timeout: Option<Duration>,
    progress: ProgressReporter,
}

impl ParallelDispatcher {
    /// 按配置创建调度器
    pub fn new(config: &Config, progress: ProgressReporter) -> Self {
        Self {
            max_workers: config.max_workers.max(1),
            rate_limiter: Arc::new(RateLimiter::new(config.min_request_interval())),
            retry_policy: config.retry_policy(),
            call_timeout: config.unit_timeout(),
            progress,
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// 与其他调度器共享同一个限流器
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn rate_limiter(&self) -> Arc<RateLimiter> {
        self.rate_limiter.clone()
    }

    /// 并行处理所有单元
    ///
    /// # 参数
    /// - `units`: 有序输入
    /// - `processor`: 处理单个单元，可能失败
    /// - `job_id`: 进度上报使用的任务 ID，为 `None` 时不上报
    /// - `operation_name`: 用于进度状态和日志的操作名称
    ///
    /// # 返回
    /// 与输入等长、同序的结果。最坏情况下每一项都是原始单元。
    pub async fn process_parallel<U, F, Fut>(
        &self,
        units: Vec<U>,
        processor: F,
        job_id: Option<&str>,
        operation_name: &str,
    ) -> Vec<U>
    where
        U: Unit,
        F: Fn(U) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<U, UnitError>> + Send + 'static,
    {
        let total = units.len();
        if total == 0 {
            return units;
        }

        log_job_start(operation_name, job_id, total, self.max_workers);

        let processor = Arc::new(processor);
        let rate_limiter = self.rate_limiter.clone();
        let retry_policy = self.retry_policy;
        let call_timeout = self.call_timeout;

        let mut results: Vec<Option<U>> = vec![None; total];
        let mut stats = JobStats {
            total,
            ..Default::default()
        };
        let mut completed = 0;

        WorkerPool::new(self.max_workers)
            .run(
                units.clone(),
                move |index, unit| {
                    let processor = processor.clone();
                    let rate_limiter = rate_limiter.clone();
                    async move {
                        process_unit(
                            index,
                            unit,
                            processor.as_ref(),
                            &rate_limiter,
                            retry_policy,
                            call_timeout,
                        )
                        .await
                    }
                },
                |index, outcome| {
                    completed += 1;
                    self.progress.report(
                        job_id,
                        completed,
                        total,
                        format!("{}: {}/{}", operation_name, completed, total),
                    );

                    match outcome {
                        Ok(Some(result)) => {
                            results[index] = Some(result);
                            stats.processed += 1;
                        }
                        Ok(None) => stats.fallback += 1,
                        Err(e) => {
                            warn!("[单元 {}] 任务异常终止，保留原文: {}", index + 1, e);
                            stats.fallback += 1;
                        }
                    }
                },
            )
            .await;

        log_job_complete(operation_name, job_id, &stats);

        results
            .into_iter()
            .zip(units)
            .map(|(result, original)| result.unwrap_or(original))
            .collect()
    }
}

/// 处理单个单元
///
/// 返回 `None` 表示应回退为原始单元。
async fn process_unit<U, F, Fut>(
    index: usize,
    unit: U,
    processor: &F,
    rate_limiter: &RateLimiter,
    retry_policy: RetryPolicy,
    call_timeout: Option<Duration>,
) -> Option<U>
where
    U: Unit,
    F: Fn(U) -> Fut,
    Fut: Future<Output = Result<U, UnitError>>,
{
    let mut retries_left = retry_policy.max_retries;

    loop {
        rate_limiter.acquire().await;

        let outcome = match call_timeout {
            Some(limit) => match tokio::time::timeout(limit, processor(unit.clone())).await {
                Ok(outcome) => outcome,
                Err(_) => Err(UnitError::timeout(limit)),
            },
            None => processor(unit.clone()).await,
        };

        match outcome {
            Ok(result) if result.is_blank() => {
                debug!("[单元 {}] 未产出内容，保留原文", index + 1);
                return None;
            }
            Ok(result) => return Some(result),
            Err(UnitError::Transient(msg)) if retries_left > 0 => {
                retries_left -= 1;
                warn!(
                    "[单元 {}] 触发限流: {}，{:?} 后重试...",
                    index + 1,
                    msg,
                    retry_policy.delay
                );
                sleep(retry_policy.delay).await;
            }
            Err(UnitError::Transient(msg)) => {
                warn!("[单元 {}] 重试后仍失败，保留原文: {}", index + 1, msg);
                return None;
            }
            Err(UnitError::Permanent(msg)) => {
                warn!("[单元 {}] 处理失败，保留原文: {}", index + 1, msg);
                return None;
            }
        }
    }
}
