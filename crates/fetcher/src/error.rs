//! Fetcher error types

use thiserror::Error;

/// Fetcher construction errors
///
/// Per-fetch failures are `contracts::FetchError` and travel inside job
/// outcomes; these only occur while building a fetcher.
#[derive(Debug, Error)]
pub enum FetcherError {
    /// HTTP client could not be built
    #[error("failed to build HTTP client: {message}")]
    ClientBuild { message: String },
}

impl FetcherError {
    /// Create client build error
    pub fn client_build(message: impl Into<String>) -> Self {
        Self::ClientBuild {
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, FetcherError>;
