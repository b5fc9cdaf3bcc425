//! Fetch metrics
//!
//! Records job outcomes and session summaries through the `metrics` facade
//! and aggregates them in memory for end-of-run reports.

use std::collections::HashMap;

use contracts::{JobOutcome, SessionReport};
use metrics::{counter, histogram};

/// Record one delivered job outcome
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_job_outcome;
///
/// record_job_outcome(&outcome);
/// ```
pub fn record_job_outcome(outcome: &JobOutcome) {
    match outcome {
        JobOutcome::Success {
            byte_count,
            elapsed,
            ..
        } => {
            counter!("fetch_timer_jobs_total", "status" => "success").increment(1);
            counter!("fetch_timer_bytes_total").increment(*byte_count);
            histogram!("fetch_timer_job_latency_ms").record(elapsed.as_secs_f64() * 1000.0);
        }
        JobOutcome::Failure { .. } => {
            counter!("fetch_timer_jobs_total", "status" => "failure").increment(1);
        }
    }
}

/// Record the end of a dispatch session
pub fn record_session(report: &SessionReport) {
    let outcome = if report.timed_out {
        "timed_out"
    } else {
        "completed"
    };
    counter!("fetch_timer_sessions_total", "outcome" => outcome).increment(1);
    histogram!("fetch_timer_session_duration_ms").record(report.elapsed.as_secs_f64() * 1000.0);

    let abandoned = report.abandoned();
    if abandoned > 0 {
        counter!("fetch_timer_jobs_abandoned_total").increment(abandoned as u64);
    }
    if report.cancelled > 0 {
        counter!("fetch_timer_jobs_cancelled_total").increment(report.cancelled as u64);
    }
}

/// Record a sink call that failed
pub fn record_sink_failure(sink_name: &str) {
    counter!(
        "fetch_timer_sink_failures_total",
        "sink" => sink_name.to_string()
    )
    .increment(1);
}

/// Fetch metrics aggregator
///
/// Aggregates outcomes and sessions in memory for summary output.
#[derive(Debug, Clone, Default)]
pub struct FetchMetricsAggregator {
    /// Sessions seen
    pub sessions: u64,

    /// Sessions ended by the deadline
    pub timed_out_sessions: u64,

    /// Delivered successes
    pub succeeded: u64,

    /// Delivered failures
    pub failed: u64,

    /// Jobs never delivered
    pub abandoned: u64,

    /// Bytes consumed by successes
    pub total_bytes: u64,

    /// Success latency (ms)
    pub latency_stats: RunningStats,

    /// Failures per job name
    pub failure_counts: HashMap<String, u64>,
}

impl FetchMetricsAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one delivered outcome
    pub fn update_outcome(&mut self, outcome: &JobOutcome) {
        match outcome {
            JobOutcome::Success {
                byte_count,
                elapsed,
                ..
            } => {
                self.succeeded += 1;
                self.total_bytes += byte_count;
                self.latency_stats.push(elapsed.as_secs_f64() * 1000.0);
            }
            JobOutcome::Failure { name, .. } => {
                self.failed += 1;
                *self.failure_counts.entry(name.clone()).or_insert(0) += 1;
            }
        }
    }

    /// Add one finished session
    pub fn update_session(&mut self, report: &SessionReport) {
        self.sessions += 1;
        if report.timed_out {
            self.timed_out_sessions += 1;
        }
        self.abandoned += report.abandoned() as u64;
    }

    /// Build a summary report
    pub fn summary(&self) -> MetricsSummary {
        let delivered = self.succeeded + self.failed;
        MetricsSummary {
            sessions: self.sessions,
            timed_out_sessions: self.timed_out_sessions,
            succeeded: self.succeeded,
            failed: self.failed,
            abandoned: self.abandoned,
            total_bytes: self.total_bytes,
            failure_rate: if delivered > 0 {
                self.failed as f64 / delivered as f64 * 100.0
            } else {
                0.0
            },
            latency_ms: StatsSummary::from(&self.latency_stats),
            failure_counts: self.failure_counts.clone(),
        }
    }

    /// Reset all counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub sessions: u64,
    pub timed_out_sessions: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub abandoned: u64,
    pub total_bytes: u64,
    pub failure_rate: f64,
    pub latency_ms: StatsSummary,
    pub failure_counts: HashMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Fetch Metrics Summary ===")?;
        writeln!(
            f,
            "Sessions: {} ({} timed out)",
            self.sessions, self.timed_out_sessions
        )?;
        writeln!(f, "Succeeded: {}", self.succeeded)?;
        writeln!(
            f,
            "Failed: {} ({:.2}%)",
            self.failed, self.failure_rate
        )?;
        writeln!(f, "Abandoned: {}", self.abandoned)?;
        writeln!(f, "Bytes: {}", self.total_bytes)?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;

        if !self.failure_counts.is_empty() {
            let mut failures: Vec<_> = self.failure_counts.iter().collect();
            failures.sort();
            writeln!(f, "Failures by job:")?;
            for (job, count) in failures {
                writeln!(f, "  {}: {}", job, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.1}, std={:.1} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a sample
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
