//! Mock fetcher
//!
//! Scripted per-target behaviour for deterministic dispatcher tests, with
//! in-flight accounting that survives task aborts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use contracts::{FetchBody, FetchError, Fetcher};
use tokio::time::sleep;
use tracing::instrument;

const CHUNK_SIZE: usize = 16 * 1024;

/// Scripted behaviour of one mock target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockRoute {
    /// Respond after `latency` with a body of `body_len` bytes
    Respond { latency: Duration, body_len: usize },
    /// Fail the request after `latency`
    Fail { latency: Duration, message: String },
    /// Respond, then break the transfer after `after_bytes`
    BrokenBody {
        latency: Duration,
        after_bytes: usize,
        message: String,
    },
    /// Never respond
    Hang,
}

impl MockRoute {
    /// Immediate response with `body_len` bytes
    pub fn ok(body_len: usize) -> Self {
        Self::Respond {
            latency: Duration::ZERO,
            body_len,
        }
    }

    /// Immediate request failure
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail {
            latency: Duration::ZERO,
            message: message.into(),
        }
    }

    /// Body that breaks after `after_bytes`
    pub fn broken_body(after_bytes: usize, message: impl Into<String>) -> Self {
        Self::BrokenBody {
            latency: Duration::ZERO,
            after_bytes,
            message: message.into(),
        }
    }

    /// Set the time to first byte (no effect on `Hang`)
    pub fn with_latency(mut self, delay: Duration) -> Self {
        match &mut self {
            Self::Respond { latency, .. }
            | Self::Fail { latency, .. }
            | Self::BrokenBody { latency, .. } => *latency = delay,
            Self::Hang => {}
        }
        self
    }
}

#[derive(Debug, Default)]
struct MockStats {
    opened: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    completed: AtomicUsize,
}

/// Point-in-time copy of mock fetcher counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockStatsSnapshot {
    /// Fetches started
    pub opened: usize,
    /// Fetches started and not yet finished or dropped
    pub in_flight: usize,
    /// Highest concurrent in-flight count observed
    pub peak_in_flight: usize,
    /// Bodies read to the end
    pub completed: usize,
}

/// Decrements the in-flight counter when dropped
struct InFlightGuard {
    stats: Arc<MockStats>,
}

impl InFlightGuard {
    fn enter(stats: &Arc<MockStats>) -> Self {
        stats.opened.fetch_add(1, Ordering::SeqCst);
        let now = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        stats.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        Self {
            stats: Arc::clone(stats),
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Mock fetcher
///
/// Clones share routes and counters. Unknown targets fail like an
/// unreachable host.
#[derive(Clone, Default)]
pub struct MockFetcher {
    routes: Arc<HashMap<String, MockRoute>>,
    stats: Arc<MockStats>,
}

impl MockFetcher {
    /// Create a fetcher with no routes
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher from `(target, route)` pairs
    pub fn with_routes<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = (S, MockRoute)>,
        S: Into<String>,
    {
        Self {
            routes: Arc::new(routes.into_iter().map(|(t, r)| (t.into(), r)).collect()),
            stats: Arc::default(),
        }
    }

    /// Current counters
    pub fn stats(&self) -> MockStatsSnapshot {
        MockStatsSnapshot {
            opened: self.stats.opened.load(Ordering::SeqCst),
            in_flight: self.stats.in_flight.load(Ordering::SeqCst),
            peak_in_flight: self.stats.peak_in_flight.load(Ordering::SeqCst),
            completed: self.stats.completed.load(Ordering::SeqCst),
        }
    }
}

impl Fetcher for MockFetcher {
    type Body = MockBody;

    #[instrument(name = "mock_fetcher_open", skip(self))]
    async fn open(&self, target: &str) -> Result<MockBody, FetchError> {
        let guard = InFlightGuard::enter(&self.stats);

        let Some(route) = self.routes.get(target).cloned() else {
            return Err(FetchError::request(target, "no such host"));
        };

        match route {
            MockRoute::Respond { latency, body_len } => {
                sleep(latency).await;
                Ok(MockBody::new(guard, body_len, None))
            }
            MockRoute::Fail { latency, message } => {
                sleep(latency).await;
                Err(FetchError::request(target, message))
            }
            MockRoute::BrokenBody {
                latency,
                after_bytes,
                message,
            } => {
                sleep(latency).await;
                let failure = FetchError::body(target, message);
                Ok(MockBody::new(guard, after_bytes, Some(failure)))
            }
            MockRoute::Hang => std::future::pending().await,
        }
    }
}

/// Body produced by [`MockFetcher`]
pub struct MockBody {
    guard: InFlightGuard,
    remaining: usize,
    failure: Option<FetchError>,
    finished: bool,
}

impl MockBody {
    fn new(guard: InFlightGuard, remaining: usize, failure: Option<FetchError>) -> Self {
        Self {
            guard,
            remaining,
            failure,
            finished: false,
        }
    }
}

impl FetchBody for MockBody {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, FetchError> {
        if self.remaining > 0 {
            let len = self.remaining.min(CHUNK_SIZE);
            self.remaining -= len;
            return Ok(Some(Bytes::from(vec![0u8; len])));
        }

        if let Some(failure) = self.failure.take() {
            return Err(failure);
        }

        if !self.finished {
            self.finished = true;
            self.guard.stats.completed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(None)
    }
}
