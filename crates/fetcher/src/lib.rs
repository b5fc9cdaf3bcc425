//! # Fetcher
//!
//! Implementations of the `Fetcher` contract.
//!
//! - [`HttpFetcher`]: HTTP(S) GET over a shared `reqwest::Client`
//! - [`MockFetcher`]: scripted latency / size / failure per target, for tests

mod error;
mod http;
mod mock;

pub use error::{FetcherError, Result};
pub use http::{HttpBody, HttpFetcher, HttpFetcherConfig};
pub use mock::{MockBody, MockFetcher, MockRoute, MockStatsSnapshot};
