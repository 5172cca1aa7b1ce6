//! Learning analytics: per-path stats, an LLM-backed suggestion feed, and
//! the dashboard rollup.

use serde::Serialize;

pub mod handlers;

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskStats {
    pub total: i64,
    pub pending: i64,
    pub complete: i64,
    pub deferred: i64,
    pub completion_rate: f64,
}

/// Folds (status, count) rows into a stats block. Unknown statuses still
/// count toward the total.
pub fn fold_task_stats(rows: &[(String, i64)]) -> TaskStats {
    let mut stats = TaskStats::default();
    for (status, count) in rows {
        stats.total += count;
        match status.as_str() {
            "pending" => stats.pending += count,
            "complete" => stats.complete += count,
            "deferred" => stats.deferred += count,
            _ => {}
        }
    }
    stats.completion_rate = if stats.total == 0 {
        0.0
    } else {
        (stats.complete as f64 / stats.total as f64 * 1000.0).round() / 10.0
    };
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(pairs: &[(&str, i64)]) -> Vec<(String, i64)> {
        pairs.iter().map(|(s, n)| (s.to_string(), *n)).collect()
    }

    #[test]
    fn test_fold_task_stats_basic() {
        let stats = fold_task_stats(&rows(&[("pending", 5), ("complete", 3), ("deferred", 2)]));
        assert_eq!(stats.total, 10);
        assert_eq!(stats.pending, 5);
        assert_eq!(stats.complete, 3);
        assert_eq!(stats.deferred, 2);
        assert_eq!(stats.completion_rate, 30.0);
    }

    #[test]
    fn test_fold_task_stats_empty() {
        let stats = fold_task_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completion_rate, 0.0);
    }

    #[test]
    fn test_fold_task_stats_unknown_status_counts_in_total() {
        let stats = fold_task_stats(&rows(&[("complete", 1), ("archived", 1)]));
        assert_eq!(stats.total, 2);
        assert_eq!(stats.completion_rate, 50.0);
    }
}
