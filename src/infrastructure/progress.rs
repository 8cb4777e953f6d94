//! 进度上报
//!
//! 进度表不是全局单例，而是注入的线程安全键值存储，
//! 测试中每个用例可以使用独立实例。

use crate::models::ProgressSnapshot;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// 进度存储抽象
pub trait ProgressStore: Send + Sync {
    /// 整体覆盖某个任务的快照（后写者胜出）
    fn set(&self, job_id: &str, snapshot: ProgressSnapshot);

    fn get(&self, job_id: &str) -> Option<ProgressSnapshot>;

    /// 由调用方决定何时清理
    fn remove(&self, job_id: &str) -> Option<ProgressSnapshot>;
}

/// 基于 DashMap 的内存进度表
#[derive(Debug, Default)]
pub struct InMemoryProgressStore {
    entries: DashMap<String, ProgressSnapshot>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn set(&self, job_id: &str, snapshot: ProgressSnapshot) {
        self.entries.insert(job_id.to_string(), snapshot);
    }

    fn get(&self, job_id: &str) -> Option<ProgressSnapshot> {
        self.entries.get(job_id).map(|entry| entry.value().clone())
    }

    fn remove(&self, job_id: &str) -> Option<ProgressSnapshot> {
        self.entries.remove(job_id).map(|(_, snapshot)| snapshot)
    }
}

/// 进度上报器
///
/// 持有存储的引用，可在各 worker 间廉价克隆。
#[derive(Clone)]
pub struct ProgressReporter {
    store: Arc<dyn ProgressStore>,
}

impl ProgressReporter {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }

    /// 使用一个独立的内存存储
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryProgressStore::new()))
    }

    /// 上报进度
    ///
    /// `job_id` 为空或未设置时不做任何事。
    pub fn report(
        &self,
        job_id: Option<&str>,
        current: usize,
        total: usize,
        status: impl Into<String>,
    ) {
        let Some(job_id) = job_id.filter(|id| !id.is_empty()) else {
            return;
        };

        let snapshot = ProgressSnapshot::new(current, total, status);
        debug!(
            "[任务 {}] 进度 {}/{} ({}%) {}",
            job_id, current, total, snapshot.percentage, snapshot.status
        );
        self.store.set(job_id, snapshot);
    }

    pub fn snapshot(&self, job_id: &str) -> Option<ProgressSnapshot> {
        self.store.get(job_id)
    }

    pub fn clear(&self, job_id: &str) -> Option<ProgressSnapshot> {
        self.store.remove(job_id)
    }

    pub fn store(&self) -> Arc<dyn ProgressStore> {
        self.store.clone()
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter").finish_non_exhaustive()
    }
}
