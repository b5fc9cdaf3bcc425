//! ResultSink trait - Collector output interface
//!
//! Defines the abstract interface for result sinks.

use crate::{ContractError, Notification};

/// Result output trait
///
/// Invoked once per delivered outcome and at most once with
/// [`Notification::TimedOut`] per dispatch session.
#[trait_variant::make(ResultSink: Send)]
pub trait LocalResultSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Receive one notification
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn receive(&mut self, notification: &Notification) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;
}
