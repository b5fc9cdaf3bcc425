//! SessionReport - summary of one dispatch session

use std::time::Duration;

/// Summary returned by every dispatch session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionReport {
    /// Jobs dispatched (`n`)
    pub dispatched: usize,
    /// Outcomes handed to the sink
    pub delivered: usize,
    /// Delivered successes
    pub succeeded: usize,
    /// Delivered failures
    pub failed: usize,
    /// Bytes consumed by delivered successes
    pub bytes: u64,
    /// Whether the deadline fired before every outcome was delivered
    pub timed_out: bool,
    /// Workers stopped through cancellation after the deadline
    pub cancelled: usize,
    /// Sink calls that returned an error
    pub sink_failures: usize,
    /// Wall time from session start to end of collection
    pub elapsed: Duration,
}

impl SessionReport {
    /// Dispatched jobs whose outcome was never delivered
    pub fn abandoned(&self) -> usize {
        self.dispatched.saturating_sub(self.delivered)
    }

    /// Whether every dispatched job was delivered
    pub fn is_complete(&self) -> bool {
        self.delivered == self.dispatched
    }
}
