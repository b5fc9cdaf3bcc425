//! JobOutcome / Notification - Worker and Collector output
//!
//! A worker turns one `JobDescriptor` into exactly one `JobOutcome`; the
//! collector wraps outcomes (and the timeout sentinel) into `Notification`s
//! for the result sink.

use std::fmt;
use std::time::Duration;

/// Outcome of executing one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Body fully consumed
    Success {
        name: String,
        byte_count: u64,
        elapsed: Duration,
    },
    /// Fetch could not be established or completed
    Failure { name: String, error: String },
}

impl JobOutcome {
    /// Create success outcome
    pub fn success(name: impl Into<String>, byte_count: u64, elapsed: Duration) -> Self {
        Self::Success {
            name: name.into(),
            byte_count,
            elapsed,
        }
    }

    /// Create failure outcome
    pub fn failure(name: impl Into<String>, error: impl fmt::Display) -> Self {
        Self::Failure {
            name: name.into(),
            error: error.to_string(),
        }
    }

    /// Name of the job this outcome belongs to
    pub fn name(&self) -> &str {
        match self {
            Self::Success { name, .. } | Self::Failure { name, .. } => name,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Bytes consumed (0 for failures)
    pub fn byte_count(&self) -> u64 {
        match self {
            Self::Success { byte_count, .. } => *byte_count,
            Self::Failure { .. } => 0,
        }
    }

    /// Elapsed time (None for failures)
    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            Self::Success { elapsed, .. } => Some(*elapsed),
            Self::Failure { .. } => None,
        }
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success {
                name,
                byte_count,
                elapsed,
            } => write!(f, "{} {} [{:.2}s]", name, byte_count, elapsed.as_secs_f64()),
            Self::Failure { name, error } => write!(f, "{}: {}", name, error),
        }
    }
}

/// What a result sink receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// One collected job outcome
    Outcome(JobOutcome),
    /// Sentinel: the collection deadline elapsed, nothing more follows
    TimedOut,
}

impl Notification {
    /// The wrapped outcome, if any
    pub fn outcome(&self) -> Option<&JobOutcome> {
        match self {
            Self::Outcome(outcome) => Some(outcome),
            Self::TimedOut => None,
        }
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

impl From<JobOutcome> for Notification {
    fn from(outcome: JobOutcome) -> Self {
        Self::Outcome(outcome)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outcome(outcome) => outcome.fmt(f),
            Self::TimedOut => write!(f, "Timed out"),
        }
    }
}
