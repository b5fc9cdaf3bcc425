//! Fetcher trait - Worker input interface
//!
//! Abstraction over an HTTP(S)-like GET: connect, stream the body, report
//! transfer errors. No header inspection, no authentication.

use bytes::Bytes;

use crate::FetchError;

/// Streaming response body
#[trait_variant::make(FetchBody: Send)]
pub trait LocalFetchBody {
    /// Next chunk of the body, `None` once the body is exhausted
    ///
    /// # Errors
    /// Returns a transfer error if the stream breaks off
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, FetchError>;
}

/// Fetch primitive consumed by workers
///
/// Implementations are shared between all workers of a session through an
/// `Arc`, so they must be cheap to call concurrently.
#[trait_variant::make(Fetcher: Send)]
pub trait LocalFetcher {
    /// Body handle returned by a successful open
    type Body: FetchBody + 'static;

    /// Establish the fetch against `target`
    ///
    /// # Errors
    /// Returns an error if the target is invalid or the connection or
    /// request fails
    async fn open(&self, target: &str) -> Result<Self::Body, FetchError>;
}
