//! Metrics registry for docpipe
//!
//! Monotonic counters only. Relaxed atomics: counters never influence
//! evaluation and a registry may be shared across threads running
//! independent pipelines.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// `execute` calls completed
    pipelines_executed: AtomicU64,
    /// Pipelines rejected at construction
    pipelines_rejected: AtomicU64,
    /// Stages run across all executions
    stages_executed: AtomicU64,
    /// Documents offered to source stages
    documents_scanned: AtomicU64,
    /// Documents emitted by final stages
    documents_returned: AtomicU64,
    /// Evaluation errors absorbed at stage boundaries
    evaluation_errors: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_pipelines_executed(&self) {
        self.pipelines_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_pipelines_rejected(&self) {
        self.pipelines_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_stages_executed(&self) {
        self.stages_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_documents_scanned(&self, count: u64) {
        self.documents_scanned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_documents_returned(&self, count: u64) {
        self.documents_returned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_evaluation_errors(&self, count: u64) {
        self.evaluation_errors.fetch_add(count, Ordering::Relaxed);
    }

    pub fn to_json(&self) -> String {
        let s = self.snapshot();
        format!(
            r#"{{"pipelines_executed":{},"pipelines_rejected":{},"stages_executed":{},"documents_scanned":{},"documents_returned":{},"evaluation_errors":{}}}"#,
            s.pipelines_executed,
            s.pipelines_rejected,
            s.stages_executed,
            s.documents_scanned,
            s.documents_returned,
            s.evaluation_errors,
        )
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pipelines_executed: self.pipelines_executed.load(Ordering::Relaxed),
            pipelines_rejected: self.pipelines_rejected.load(Ordering::Relaxed),
            stages_executed: self.stages_executed.load(Ordering::Relaxed),
            documents_scanned: self.documents_scanned.load(Ordering::Relaxed),
            documents_returned: self.documents_returned.load(Ordering::Relaxed),
            evaluation_errors: self.evaluation_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of every counter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub pipelines_executed: u64,
    pub pipelines_rejected: u64,
    pub stages_executed: u64,
    pub documents_scanned: u64,
    pub documents_returned: u64,
    pub evaluation_errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_is_zero() {
        assert_eq!(MetricsRegistry::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_counters() {
        let registry = MetricsRegistry::new();
        registry.increment_pipelines_executed();
        registry.increment_pipelines_rejected();
        registry.increment_stages_executed();
        registry.increment_stages_executed();
        registry.add_documents_scanned(10);
        registry.add_documents_returned(3);
        registry.add_evaluation_errors(2);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.pipelines_executed, 1);
        assert_eq!(snapshot.pipelines_rejected, 1);
        assert_eq!(snapshot.stages_executed, 2);
        assert_eq!(snapshot.documents_scanned, 10);
        assert_eq!(snapshot.documents_returned, 3);
        assert_eq!(snapshot.evaluation_errors, 2);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.add_documents_scanned(1234);

        let parsed: serde_json::Value = serde_json::from_str(&registry.to_json()).unwrap();
        assert_eq!(parsed["documents_scanned"], 1234);
        assert_eq!(parsed["pipelines_executed"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..100 {
                        reg.increment_pipelines_executed();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.snapshot().pipelines_executed, 800);
    }
}
