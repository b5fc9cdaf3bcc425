//! Layered error definitions
//!
//! Categorized by source: config (job source) / fetch / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Job Source Errors =====
    /// Job manifest parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Job manifest validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}

/// Per-job fetch error
///
/// Never aborts a dispatch session: workers fold it into
/// [`JobOutcome::Failure`](crate::JobOutcome::Failure).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Target could not be turned into a request
    #[error("invalid target '{target}': {message}")]
    InvalidTarget { target: String, message: String },

    /// Connection could not be established or the request failed
    #[error("Get \"{target}\": {message}")]
    Request { target: String, message: String },

    /// Transfer broke off while the body was streaming
    #[error("reading body of \"{target}\": {message}")]
    Body { target: String, message: String },
}

impl FetchError {
    /// Create invalid target error
    pub fn invalid_target(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTarget {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create request error
    pub fn request(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Request {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create body transfer error
    pub fn body(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Body {
            target: target.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation_display() {
        let err = ContractError::config_validation("jobs[0].url", "must not be empty");
        assert_eq!(
            err.to_string(),
            "config validation error at 'jobs[0].url': must not be empty"
        );
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::request("http://127.0.0.1:1/", "connection refused");
        assert_eq!(
            err.to_string(),
            "Get \"http://127.0.0.1:1/\": connection refused"
        );
    }
}
