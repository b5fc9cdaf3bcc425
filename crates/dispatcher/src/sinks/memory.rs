//! MemorySink - keeps every notification in order

use contracts::{ContractError, JobOutcome, Notification, ResultSink};

/// Sink that records notifications in a vector
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    name: String,
    notifications: Vec<Notification>,
    flushes: usize,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Everything received, in delivery order
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Received outcomes, in delivery order
    pub fn outcomes(&self) -> impl Iterator<Item = &JobOutcome> {
        self.notifications.iter().filter_map(Notification::outcome)
    }

    /// Job names of received outcomes, in delivery order
    pub fn outcome_names(&self) -> Vec<String> {
        self.outcomes().map(|o| o.name().to_string()).collect()
    }

    pub fn timed_out_count(&self) -> usize {
        self.notifications.iter().filter(|n| n.is_timed_out()).count()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    pub fn into_notifications(self) -> Vec<Notification> {
        self.notifications
    }
}

impl ResultSink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn receive(&mut self, notification: &Notification) -> Result<(), ContractError> {
        self.notifications.push(notification.clone());
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        self.flushes += 1;
        Ok(())
    }
}
