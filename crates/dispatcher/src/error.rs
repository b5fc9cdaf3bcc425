//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
///
/// Per-job failures never appear here; they are delivered as outcomes.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Job source could not be read; nothing was dispatched
    #[error("job source error: {0}")]
    JobSource(#[from] contracts::ContractError),

    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
