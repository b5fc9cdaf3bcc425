//! Worker - executes exactly one job

use contracts::{FetchBody, Fetcher, JobDescriptor, JobOutcome};
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Execute one job against `fetcher`
///
/// Opens the target, consumes the whole body counting bytes and reports the
/// elapsed time. Fetch errors become [`JobOutcome::Failure`]; nothing is
/// retried and no per-job timeout applies.
#[instrument(
    name = "worker_execute",
    skip(fetcher, job),
    fields(job = %job.name(), target = %job.target())
)]
pub async fn execute<F: Fetcher>(fetcher: &F, job: &JobDescriptor) -> JobOutcome {
    let start = Instant::now();

    let mut body = match fetcher.open(job.target()).await {
        Ok(body) => body,
        Err(e) => {
            debug!(error = %e, "Fetch failed");
            return JobOutcome::failure(job.name(), e);
        }
    };

    let mut byte_count: u64 = 0;
    loop {
        match body.next_chunk().await {
            Ok(Some(chunk)) => byte_count += chunk.len() as u64,
            Ok(None) => break,
            Err(e) => {
                debug!(error = %e, bytes = byte_count, "Body transfer failed");
                return JobOutcome::failure(job.name(), e);
            }
        }
    }

    let elapsed = start.elapsed();
    debug!(
        bytes = byte_count,
        elapsed_ms = elapsed.as_millis() as u64,
        "Fetch complete"
    );
    JobOutcome::success(job.name(), byte_count, elapsed)
}
