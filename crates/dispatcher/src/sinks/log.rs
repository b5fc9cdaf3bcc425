//! LogSink - logs notifications via tracing

use contracts::{ContractError, JobOutcome, Notification, ResultSink};
use tracing::{info, instrument, warn};

/// Sink that turns every notification into a log event
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_notification(&self, notification: &Notification) {
        match notification {
            Notification::Outcome(JobOutcome::Success {
                name,
                byte_count,
                elapsed,
            }) => info!(
                sink = %self.name,
                job = %name,
                bytes = byte_count,
                elapsed_ms = elapsed.as_millis() as u64,
                "Job succeeded"
            ),
            Notification::Outcome(JobOutcome::Failure { name, error }) => warn!(
                sink = %self.name,
                job = %name,
                error = %error,
                "Job failed"
            ),
            Notification::TimedOut => warn!(sink = %self.name, "Timed out"),
        }
    }
}

impl ResultSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_sink_receive", skip(self, notification), fields(sink = %self.name))]
    async fn receive(&mut self, notification: &Notification) -> Result<(), ContractError> {
        self.log_notification(notification);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_log_sink_receive() {
        let mut sink = LogSink::new("test_log");
        let outcome = JobOutcome::success("Go", 42, Duration::from_millis(5));

        assert!(sink.receive(&outcome.into()).await.is_ok());
        assert!(sink.receive(&Notification::TimedOut).await.is_ok());
        assert!(sink.flush().await.is_ok());
    }

    #[test]
    fn test_log_sink_name() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }
}
