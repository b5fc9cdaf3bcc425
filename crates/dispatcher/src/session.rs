//! DispatchSession - one worker per job, deadline-bounded collection
//!
//! A session owns everything one dispatch needs: the job count, the
//! receiving half of the shared outcome channel, the absolute deadline and
//! the worker task set. Nothing is global, so independent sessions can run
//! side by side.

use std::sync::Arc;

use contracts::{
    DispatchConfig, Fetcher, JobDescriptor, JobOutcome, Notification, ResultSink, SessionReport,
    TimeoutPolicy,
};
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::metrics::{MetricsSnapshot, SessionMetrics};
use crate::worker;

/// A running dispatch session
///
/// Created by [`DispatchSession::start`], which spawns every worker up
/// front; consumed by [`DispatchSession::collect`].
pub struct DispatchSession {
    dispatched: usize,
    rx: mpsc::UnboundedReceiver<JobOutcome>,
    started_at: Instant,
    deadline: Instant,
    on_timeout: TimeoutPolicy,
    workers: JoinSet<()>,
    cancel: CancellationToken,
    metrics: Arc<SessionMetrics>,
}

impl DispatchSession {
    /// Spawn one worker per job and start the deadline clock
    ///
    /// Never waits on any individual worker.
    #[instrument(
        name = "dispatch_session_start",
        skip(fetcher, jobs, config),
        fields(jobs = jobs.len(), timeout_ms = config.timeout_ms)
    )]
    pub fn start<F>(fetcher: Arc<F>, jobs: Vec<JobDescriptor>, config: &DispatchConfig) -> Self
    where
        F: Fetcher + Sync + 'static,
    {
        let started_at = Instant::now();
        let deadline = started_at + config.timeout();
        let dispatched = jobs.len();

        let (tx, rx) = mpsc::unbounded_channel();
        let limiter = config
            .max_in_flight
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));
        let cancel = CancellationToken::new();
        let metrics = Arc::new(SessionMetrics::new());

        let mut workers = JoinSet::new();
        for job in jobs {
            workers.spawn(run_worker(
                Arc::clone(&fetcher),
                job,
                tx.clone(),
                limiter.clone(),
                cancel.clone(),
                Arc::clone(&metrics),
            ));
        }
        // Only workers hold senders from here on
        drop(tx);

        debug!(
            dispatched,
            max_in_flight = ?config.max_in_flight,
            on_timeout = ?config.on_timeout,
            "Workers spawned"
        );

        Self {
            dispatched,
            rx,
            started_at,
            deadline,
            on_timeout: config.on_timeout,
            workers,
            cancel,
            metrics,
        }
    }

    /// Number of jobs dispatched
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    /// Absolute collection deadline
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Current counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Collect outcomes until all arrived or the deadline elapsed
    ///
    /// Runs at most `dispatched` iterations, each racing the next outcome
    /// against the single session deadline. Outcomes reach the sink in
    /// arrival order. If the deadline wins, the sink receives one
    /// [`Notification::TimedOut`] and collection stops without draining
    /// anything else. Outcomes already queued when the deadline is observed
    /// are not delivered.
    ///
    /// Unfinished workers are then detached or cancelled according to the
    /// session's [`TimeoutPolicy`]. Detached workers run on and their
    /// outcomes are discarded.
    #[instrument(
        name = "dispatch_session_collect",
        skip(self, sink),
        fields(dispatched = self.dispatched, sink = %sink.name())
    )]
    pub async fn collect<S: ResultSink>(self, sink: &mut S) -> SessionReport {
        let Self {
            dispatched,
            mut rx,
            started_at,
            deadline,
            on_timeout,
            mut workers,
            cancel,
            metrics,
        } = self;

        let mut timed_out = false;
        let deadline_sleep = sleep_until(deadline);
        tokio::pin!(deadline_sleep);

        for _ in 0..dispatched {
            tokio::select! {
                biased;

                () = &mut deadline_sleep => {
                    timed_out = true;
                    let snapshot = metrics.snapshot();
                    warn!(
                        delivered = snapshot.delivered,
                        pending = dispatched - snapshot.delivered,
                        "Collection deadline elapsed"
                    );
                    deliver(sink, &Notification::TimedOut, &metrics).await;
                    break;
                }
                received = rx.recv() => match received {
                    Some(outcome) => {
                        metrics.record_delivered(outcome.is_success(), outcome.byte_count());
                        observability::record_job_outcome(&outcome);
                        deliver(sink, &Notification::Outcome(outcome), &metrics).await;
                    }
                    None => {
                        error!("Every worker exited before all outcomes were delivered");
                        break;
                    }
                }
            }
        }

        let elapsed = started_at.elapsed();

        if let Err(e) = sink.flush().await {
            metrics.inc_sink_failures();
            error!(sink = %sink.name(), error = %e, "Sink flush failed");
        }

        // Late outcomes have nowhere to go
        drop(rx);
        settle_workers(&mut workers, &cancel, timed_out, on_timeout).await;

        let snapshot = metrics.snapshot();
        let report = SessionReport {
            dispatched,
            delivered: snapshot.delivered,
            succeeded: snapshot.succeeded,
            failed: snapshot.failed,
            bytes: snapshot.bytes,
            timed_out,
            cancelled: snapshot.cancelled,
            sink_failures: snapshot.sink_failures,
            elapsed,
        };
        observability::record_session(&report);

        info!(
            dispatched,
            delivered = report.delivered,
            failed = report.failed,
            abandoned = report.abandoned(),
            timed_out,
            elapsed_ms = elapsed.as_millis() as u64,
            "Dispatch session finished"
        );

        report
    }
}

/// Hand one notification to the sink; failures are logged and counted
pub(crate) async fn deliver<S: ResultSink>(
    sink: &mut S,
    notification: &Notification,
    metrics: &SessionMetrics,
) {
    if let Err(e) = sink.receive(notification).await {
        metrics.inc_sink_failures();
        observability::record_sink_failure(sink.name());
        error!(sink = %sink.name(), error = %e, "Sink receive failed");
    }
}

/// Worker task body
async fn run_worker<F>(
    fetcher: Arc<F>,
    job: JobDescriptor,
    tx: mpsc::UnboundedSender<JobOutcome>,
    limiter: Option<Arc<Semaphore>>,
    cancel: CancellationToken,
    metrics: Arc<SessionMetrics>,
) where
    F: Fetcher + Sync,
{
    let work = async {
        let _permit = acquire(limiter).await;
        metrics.inc_started();
        worker::execute(fetcher.as_ref(), &job).await
    };

    let outcome = tokio::select! {
        biased;

        () = cancel.cancelled() => {
            metrics.inc_cancelled();
            debug!(job = %job.name(), "Worker cancelled");
            return;
        }
        outcome = work => outcome,
    };

    metrics.inc_finished();
    if tx.send(outcome).is_err() {
        metrics.inc_orphaned();
        debug!(job = %job.name(), "Collector gone, outcome discarded");
    }
}

async fn acquire(limiter: Option<Arc<Semaphore>>) -> Option<OwnedSemaphorePermit> {
    match limiter {
        // The semaphore is never closed
        Some(semaphore) => semaphore.acquire_owned().await.ok(),
        None => None,
    }
}

/// Apply the timeout policy, then reap whatever is left to join
async fn settle_workers(
    workers: &mut JoinSet<()>,
    cancel: &CancellationToken,
    timed_out: bool,
    policy: TimeoutPolicy,
) {
    if timed_out {
        match policy {
            TimeoutPolicy::Detach => {
                let unjoined = workers.len();
                workers.detach_all();
                warn!(
                    unjoined,
                    "Unfinished workers left running, their outcomes will be discarded"
                );
                return;
            }
            TimeoutPolicy::Cancel => {
                debug!(unjoined = workers.len(), "Cancelling unfinished workers");
                cancel.cancel();
            }
        }
    }

    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            if e.is_panic() {
                error!(error = %e, "Worker task panicked");
            }
        }
    }
}
