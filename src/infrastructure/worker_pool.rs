//! 有界并发执行
//!
//! 每个输入项对应一个 tokio 任务，由 Semaphore 控制同时运行的数量。
//! 完成顺序不受约束，回调按完成顺序触发，并带回输入项的原始索引。
//! `run` 返回的 future 被丢弃时，尚未结束的任务会被一并取消。

use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};

/// 固定宽度的 worker 池
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    max_workers: usize,
}

impl WorkerPool {
    /// 创建 worker 池，宽度至少为 1
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// 并发执行所有任务
    ///
    /// # 参数
    /// - `items`: 有序输入
    /// - `task`: 处理单个输入项，参数为 (原始索引, 输入项)
    /// - `on_complete`: 每个任务结束时调用，参数为 (原始索引, 结果)；
    ///   任务 panic 时结果为 `Err(JoinError)`
    pub async fn run<T, R, F, Fut, C>(&self, items: Vec<T>, task: F, mut on_complete: C)
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(usize, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        C: FnMut(usize, Result<R, JoinError>),
    {
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let task = Arc::new(task);
        let mut pending = FuturesUnordered::new();

        for (index, item) in items.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let task = task.clone();

            let handle = tokio::spawn(async move {
                // 信号量不会被关闭，acquire 只会成功
                let _permit = semaphore.acquire_owned().await.ok();
                task(index, item).await
            });

            let handle = AbortOnDrop(handle);
            pending.push(async move { (index, handle.await) });
        }

        while let Some((index, outcome)) = pending.next().await {
            on_complete(index, outcome);
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(5)
    }
}

/// 被丢弃时取消对应任务的 `JoinHandle`
struct AbortOnDrop<R>(JoinHandle<R>);

impl<R> Future for AbortOnDrop<R> {
    type Output = Result<R, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl<R> Drop for AbortOnDrop<R> {
    fn drop(&mut self) {
        self.0.abort();
    }
}
