//! Session metrics shared between workers and the collector

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters for one dispatch session
#[derive(Debug, Default)]
pub struct SessionMetrics {
    /// Workers that started their fetch
    started: AtomicUsize,
    /// Workers that produced an outcome
    finished: AtomicUsize,
    /// Outcomes whose send found the collector gone
    orphaned: AtomicUsize,
    /// Workers stopped by cancellation
    cancelled: AtomicUsize,
    /// Outcomes handed to the sink
    delivered: AtomicUsize,
    /// Delivered successes
    succeeded: AtomicUsize,
    /// Delivered failures
    failed: AtomicUsize,
    /// Bytes of delivered successes
    bytes: AtomicU64,
    /// Sink calls that failed
    sink_failures: AtomicUsize,
}

impl SessionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_started(&self) {
        self.started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_finished(&self) {
        self.finished.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_orphaned(&self) {
        self.orphaned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one delivered outcome
    pub fn record_delivered(&self, success: bool, bytes: u64) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        if success {
            self.succeeded.fetch_add(1, Ordering::Relaxed);
            self.bytes.fetch_add(bytes, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn inc_sink_failures(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            started: self.started.load(Ordering::Relaxed),
            finished: self.finished.load(Ordering::Relaxed),
            orphaned: self.orphaned.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of session metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub started: usize,
    pub finished: usize,
    pub orphaned: usize,
    pub cancelled: usize,
    pub delivered: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub bytes: u64,
    pub sink_failures: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_delivered() {
        let metrics = SessionMetrics::new();
        metrics.record_delivered(true, 10);
        metrics.record_delivered(true, 5);
        metrics.record_delivered(false, 99);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.delivered, 3);
        assert_eq!(snapshot.succeeded, 2);
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.bytes, 15);
    }
}
