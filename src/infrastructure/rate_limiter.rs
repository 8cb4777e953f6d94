//! 请求节奏控制
//!
//! 所有 worker 共享同一个上次请求时间戳，只有"何时可以开始"这一决定被串行化，
//! 真正的外部调用在锁外执行。

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// 最小间隔限流器
///
/// 保证同一实例守护的任意两次调用的开始时间至少相隔 `min_interval`。
/// 不保证按到达顺序放行，先拿到锁的 worker 先走。
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// 等待到允许发起下一次请求，并记录本次开始时间
    ///
    /// 锁在函数返回时释放。
    pub async fn acquire(&self) {
        let mut last_request = self.last_request.lock().await;

        if let Some(previous) = *last_request {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!("限流等待 {:?}", wait);
                sleep(wait).await;
            }
        }

        *last_request = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_millis(200))
    }
}
