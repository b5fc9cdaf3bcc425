//! Dispatcher - entry points for one dispatch-and-collect run

use std::sync::Arc;
use std::time::Duration;

use contracts::{
    DispatchConfig, Fetcher, JobDescriptor, JobSource, ResultSink, SessionReport, TimeoutPolicy,
};
use tracing::{debug, info, instrument};

use crate::error::DispatcherError;
use crate::session::DispatchSession;

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder<F> {
    fetcher: Arc<F>,
    config: DispatchConfig,
}

impl<F: Fetcher + Sync + 'static> DispatcherBuilder<F> {
    /// Create a builder with default dispatch settings
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            config: DispatchConfig::default(),
        }
    }

    /// Replace all settings at once
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn max_in_flight(mut self, limit: usize) -> Self {
        self.config.max_in_flight = Some(limit);
        self
    }

    pub fn on_timeout(mut self, policy: TimeoutPolicy) -> Self {
        self.config.on_timeout = policy;
        self
    }

    /// Build the dispatcher
    pub fn build(self) -> Dispatcher<F> {
        Dispatcher {
            fetcher: self.fetcher,
            config: self.config,
        }
    }
}

/// Runs dispatch sessions against one fetcher
///
/// Holds no per-session state; every call starts an independent
/// [`DispatchSession`].
pub struct Dispatcher<F> {
    fetcher: Arc<F>,
    config: DispatchConfig,
}

impl<F: Fetcher + Sync + 'static> Dispatcher<F> {
    /// Create a dispatcher owning `fetcher`
    pub fn new(fetcher: F, config: DispatchConfig) -> Self {
        Self::from_shared(Arc::new(fetcher), config)
    }

    /// Create a dispatcher sharing an existing fetcher
    pub fn from_shared(fetcher: Arc<F>, config: DispatchConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &Arc<F> {
        &self.fetcher
    }

    /// Spawn workers for `jobs` and return the session to collect from
    pub fn start(&self, jobs: Vec<JobDescriptor>) -> DispatchSession {
        DispatchSession::start(Arc::clone(&self.fetcher), jobs, &self.config)
    }

    /// Dispatch `jobs` and deliver outcomes to `sink` until done or timed out
    #[instrument(
        name = "dispatcher_dispatch_and_collect",
        skip(self, jobs, sink),
        fields(jobs = jobs.len(), sink = %sink.name())
    )]
    pub async fn dispatch_and_collect<S: ResultSink>(
        &self,
        jobs: Vec<JobDescriptor>,
        sink: &mut S,
    ) -> SessionReport {
        self.start(jobs).collect(sink).await
    }

    /// Drain `source`, then dispatch everything it produced
    ///
    /// A source error aborts before any worker is spawned.
    #[instrument(name = "dispatcher_run_source", skip(self, source, sink))]
    pub async fn run_source<J, S>(
        &self,
        source: &mut J,
        sink: &mut S,
    ) -> Result<SessionReport, DispatcherError>
    where
        J: JobSource + ?Sized,
        S: ResultSink,
    {
        let jobs = collect_jobs(source)?;
        info!(jobs = jobs.len(), "Job source drained");
        Ok(self.dispatch_and_collect(jobs, sink).await)
    }
}

/// Read every descriptor from `source`
///
/// All or nothing: the first error is returned and the descriptors read so
/// far are discarded.
pub fn collect_jobs<J: JobSource + ?Sized>(
    source: &mut J,
) -> Result<Vec<JobDescriptor>, DispatcherError> {
    let mut jobs = Vec::new();
    while let Some(job) = source.next_job()? {
        jobs.push(job);
    }
    debug!(jobs = jobs.len(), "Collected jobs from source");
    Ok(jobs)
}

/// Dispatch `jobs` with `timeout` and default settings otherwise
pub async fn dispatch_and_collect<F, S>(
    fetcher: F,
    jobs: Vec<JobDescriptor>,
    timeout: Duration,
    sink: &mut S,
) -> SessionReport
where
    F: Fetcher + Sync + 'static,
    S: ResultSink,
{
    Dispatcher::new(fetcher, DispatchConfig::with_timeout(timeout))
        .dispatch_and_collect(jobs, sink)
        .await
}
