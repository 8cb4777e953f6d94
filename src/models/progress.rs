use serde::{Deserialize, Serialize};

/// 任务进度快照
///
/// 每完成一个单元就整体覆盖一次，外部（HTTP 状态接口等）随时可读。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub current: usize,
    pub total: usize,
    pub status: String,
    /// 0..=100，`total == 0` 时为 0
    pub percentage: u8,
}

impl ProgressSnapshot {
    pub fn new(current: usize, total: usize, status: impl Into<String>) -> Self {
        Self {
            current,
            total,
            status: status.into(),
            percentage: percentage(current, total),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.current >= self.total
    }
}

/// 向下取整的百分比，超过 100 时截断
fn percentage(current: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let value = (current as u128 * 100) / total as u128;
    value.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_floor() {
        assert_eq!(ProgressSnapshot::new(1, 3, "").percentage, 33);
        assert_eq!(ProgressSnapshot::new(2, 3, "").percentage, 66);
        assert_eq!(ProgressSnapshot::new(3, 3, "").percentage, 100);
    }

    #[test]
    fn test_zero_total() {
        let snapshot = ProgressSnapshot::new(0, 0, "Processing: 0/0");
        assert_eq!(snapshot.percentage, 0);
        assert!(!snapshot.is_complete());
    }

    #[test]
    fn test_percentage_clamped() {
        assert_eq!(ProgressSnapshot::new(7, 5, "").percentage, 100);
    }

    #[test]
    fn test_serializes_for_status_endpoint() {
        let snapshot = ProgressSnapshot::new(1, 4, "Translating: 1/4");
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["percentage"], 25);
        assert_eq!(json["status"], "Translating: 1/4");
    }
}
