//! Tee - forwards every notification to two sinks

use contracts::{ContractError, Notification, ResultSink};

/// Sink pair receiving the same notifications
///
/// Both sides are always called. If both fail, the first error wins.
pub struct Tee<A, B> {
    name: String,
    first: A,
    second: B,
}

impl<A: ResultSink, B: ResultSink> Tee<A, B> {
    pub fn new(first: A, second: B) -> Self {
        let name = format!("{}+{}", first.name(), second.name());
        Self {
            name,
            first,
            second,
        }
    }

    pub fn into_parts(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: ResultSink, B: ResultSink> ResultSink for Tee<A, B> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn receive(&mut self, notification: &Notification) -> Result<(), ContractError> {
        let first = self.first.receive(notification).await;
        let second = self.second.receive(notification).await;
        first.and(second)
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        let first = self.first.flush().await;
        let second = self.second.flush().await;
        first.and(second)
    }
}
