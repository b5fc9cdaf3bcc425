//! Run statistics.

use contracts::{JobOutcome, SessionReport};
use observability::FetchMetricsAggregator;

/// Statistics from one run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Report of the session
    pub report: SessionReport,

    /// Aggregated outcomes
    pub metrics: FetchMetricsAggregator,
}

impl RunStats {
    pub fn new<'a>(report: SessionReport, outcomes: impl Iterator<Item = &'a JobOutcome>) -> Self {
        let mut metrics = FetchMetricsAggregator::new();
        for outcome in outcomes {
            metrics.update_outcome(outcome);
        }
        metrics.update_session(&report);
        Self { report, metrics }
    }

    /// Successful bytes per second over the whole run
    pub fn throughput(&self) -> f64 {
        let secs = self.report.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.report.bytes as f64 / secs
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Run Statistics ===\n");
        println!("Overview");
        println!("  Duration: {:.2}s", self.report.elapsed.as_secs_f64());
        println!("  Dispatched: {}", self.report.dispatched);
        println!("  Delivered: {}", self.report.delivered);
        println!("  Abandoned: {}", self.report.abandoned());
        println!("  Cancelled: {}", self.report.cancelled);
        println!("  Timed out: {}", if self.report.timed_out { "yes" } else { "no" });
        println!("  Throughput: {:.0} B/s", self.throughput());
        if self.report.sink_failures > 0 {
            println!("  Sink failures: {}", self.report.sink_failures);
        }

        println!("\n{}", self.metrics.summary());
    }
}
