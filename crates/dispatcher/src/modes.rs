//! Alternative run modes
//!
//! `run_sequential` fetches one job after another. `run_detached` spawns
//! every fetch, lets each worker report on its own, and waits a fixed grace
//! period instead of collecting. The deadline-bounded collector lives in
//! [`crate::session`].

use std::sync::Arc;
use std::time::Duration;

use contracts::{Fetcher, JobDescriptor, Notification, ResultSink, SessionReport};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::{timeout, Instant};
use tracing::{error, info, instrument, warn};

use crate::metrics::SessionMetrics;
use crate::session::deliver;
use crate::worker;

/// Fetch every job in input order, awaiting each before the next
///
/// Each outcome reaches the sink as soon as its fetch finishes, so sink
/// order equals job order. There is no deadline.
#[instrument(name = "run_sequential", skip(fetcher, jobs, sink), fields(jobs = jobs.len()))]
pub async fn run_sequential<F, S>(
    fetcher: &F,
    jobs: &[JobDescriptor],
    sink: &mut S,
) -> SessionReport
where
    F: Fetcher + Sync,
    S: ResultSink,
{
    let started_at = Instant::now();
    let metrics = SessionMetrics::new();

    for job in jobs {
        metrics.inc_started();
        let outcome = worker::execute(fetcher, job).await;
        metrics.inc_finished();
        metrics.record_delivered(outcome.is_success(), outcome.byte_count());
        observability::record_job_outcome(&outcome);
        deliver(sink, &Notification::Outcome(outcome), &metrics).await;
    }

    if let Err(e) = sink.flush().await {
        metrics.inc_sink_failures();
        error!(sink = %sink.name(), error = %e, "Sink flush failed");
    }

    let report = build_report(jobs.len(), &metrics, false, started_at.elapsed());
    observability::record_session(&report);
    info!(
        dispatched = report.dispatched,
        failed = report.failed,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Sequential run finished"
    );
    report
}

/// Spawn every job; each worker hands its own outcome to the shared sink
///
/// Returns once every worker finished or `grace` elapsed, whichever comes
/// first. Workers still running at that point are aborted and counted as
/// cancelled; no sentinel is delivered.
#[instrument(
    name = "run_detached",
    skip(fetcher, jobs, sink),
    fields(jobs = jobs.len(), grace_ms = grace.as_millis() as u64)
)]
pub async fn run_detached<F, S>(
    fetcher: Arc<F>,
    jobs: Vec<JobDescriptor>,
    grace: Duration,
    sink: Arc<Mutex<S>>,
) -> SessionReport
where
    F: Fetcher + Sync + 'static,
    S: ResultSink + 'static,
{
    let started_at = Instant::now();
    let dispatched = jobs.len();
    let metrics = Arc::new(SessionMetrics::new());

    let mut workers = JoinSet::new();
    for job in jobs {
        let fetcher = Arc::clone(&fetcher);
        let sink = Arc::clone(&sink);
        let metrics = Arc::clone(&metrics);
        workers.spawn(async move {
            metrics.inc_started();
            let outcome = worker::execute(fetcher.as_ref(), &job).await;
            metrics.inc_finished();
            observability::record_job_outcome(&outcome);
            let (success, bytes) = (outcome.is_success(), outcome.byte_count());

            // Counted only once the sink has it; an abort before this point
            // leaves the job abandoned.
            let mut sink = sink.lock().await;
            deliver(&mut *sink, &Notification::Outcome(outcome), &metrics).await;
            metrics.record_delivered(success, bytes);
        });
    }

    let all_done = async {
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Worker task failed");
            }
        }
    };
    let timed_out = timeout(grace, all_done).await.is_err();

    if timed_out {
        let unfinished = workers.len();
        warn!(unfinished, "Grace period elapsed, abandoning unfinished fetches");
        workers.abort_all();
        while let Some(joined) = workers.join_next().await {
            if matches!(joined, Err(e) if e.is_cancelled()) {
                metrics.inc_cancelled();
            }
        }
    }

    {
        let mut sink = sink.lock().await;
        if let Err(e) = sink.flush().await {
            metrics.inc_sink_failures();
            error!(sink = %sink.name(), error = %e, "Sink flush failed");
        }
    }

    let report = build_report(dispatched, &metrics, timed_out, started_at.elapsed());
    observability::record_session(&report);
    info!(
        dispatched,
        delivered = report.delivered,
        abandoned = report.abandoned(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Detached run finished"
    );
    report
}

fn build_report(
    dispatched: usize,
    metrics: &SessionMetrics,
    timed_out: bool,
    elapsed: Duration,
) -> SessionReport {
    let snapshot = metrics.snapshot();
    SessionReport {
        dispatched,
        delivered: snapshot.delivered,
        succeeded: snapshot.succeeded,
        failed: snapshot.failed,
        bytes: snapshot.bytes,
        timed_out,
        cancelled: snapshot.cancelled,
        sink_failures: snapshot.sink_failures,
        elapsed,
    }
}
