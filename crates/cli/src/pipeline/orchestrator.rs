//! Run orchestrator - wires fetcher, sinks and the chosen run mode.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use contracts::{DispatchConfig, Fetcher, JobDescriptor, ResultSink, SessionReport};
use dispatcher::{ConsoleSink, Dispatcher, LogSink, MemorySink, ReportSink, Tee};
use fetcher::HttpFetcher;
use tokio::sync::Mutex;
use tracing::info;

use super::RunStats;
use crate::cli::RunMode;
use crate::error::CliError;

/// Run configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Jobs in manifest order
    pub jobs: Vec<JobDescriptor>,

    /// Effective dispatch settings
    pub dispatch: DispatchConfig,

    /// Execution strategy
    pub mode: RunMode,

    /// Wait period of the detached mode
    pub grace: Duration,

    /// JSON-lines report file (None = no report)
    pub report_path: Option<PathBuf>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main run orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Fetch every job and print one line per result, then the total line
    pub async fn run(self) -> Result<RunStats> {
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let fetcher = HttpFetcher::new().context("Failed to build HTTP client")?;
        let console = Tee::new(
            Tee::new(ConsoleSink::stdout(), LogSink::new("log")),
            MemorySink::new("summary"),
        );

        let (report, memory) = match &self.config.report_path {
            Some(path) => {
                let report_sink = ReportSink::create(path)
                    .with_context(|| format!("Failed to open report {}", path.display()))?;
                info!(path = %path.display(), "Writing report");
                let (report, sink) = self.execute(fetcher, Tee::new(console, report_sink)).await?;
                let (console, _) = sink.into_parts();
                (report, console.into_parts().1)
            }
            None => {
                let (report, sink) = self.execute(fetcher, console).await?;
                (report, sink.into_parts().1)
            }
        };

        write_total(&mut io::stdout().lock(), &report)?;

        Ok(RunStats::new(report, memory.outcomes()))
    }

    /// Run the configured mode, handing the sink back afterwards
    async fn execute<F, S>(&self, fetcher: F, mut sink: S) -> Result<(SessionReport, S)>
    where
        F: Fetcher + Sync + 'static,
        S: ResultSink + 'static,
    {
        let jobs = self.config.jobs.clone();
        info!(mode = ?self.config.mode, jobs = jobs.len(), "Starting run");

        let report = match self.config.mode {
            RunMode::Sequential => dispatcher::run_sequential(&fetcher, &jobs, &mut sink).await,
            RunMode::Detached => {
                let shared = Arc::new(Mutex::new(sink));
                let report = dispatcher::run_detached(
                    Arc::new(fetcher),
                    jobs,
                    self.config.grace,
                    Arc::clone(&shared),
                )
                .await;
                sink = Arc::try_unwrap(shared)
                    .map_err(|_| CliError::SinkStillShared)?
                    .into_inner();
                report
            }
            RunMode::Concurrent => {
                Dispatcher::new(fetcher, self.config.dispatch.clone())
                    .dispatch_and_collect(jobs, &mut sink)
                    .await
            }
        };

        Ok((report, sink))
    }
}

/// Closing line of every run, timed out or not
fn write_total<W: Write>(out: &mut W, report: &SessionReport) -> io::Result<()> {
    writeln!(out, "{:.2}s total", report.elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fetcher::{MockFetcher, MockRoute};

    fn pipeline(mode: RunMode, timeout: Duration) -> Pipeline {
        Pipeline::new(PipelineConfig {
            jobs: vec![
                JobDescriptor::new("Go", "mock://go"),
                JobDescriptor::new("Slow", "mock://slow"),
            ],
            dispatch: DispatchConfig::with_timeout(timeout),
            mode,
            grace: Duration::from_secs(10),
            report_path: None,
            metrics_port: None,
        })
    }

    fn mock_fetcher() -> MockFetcher {
        MockFetcher::with_routes([
            ("mock://go", MockRoute::ok(4).with_latency(Duration::from_millis(100))),
            ("mock://slow", MockRoute::Hang),
        ])
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_line_after_timed_out_run() {
        let pipeline = pipeline(RunMode::Concurrent, Duration::from_secs(1));
        let console = ConsoleSink::with_writer("console", Vec::new());

        let (report, console) = pipeline.execute(mock_fetcher(), console).await.unwrap();
        let mut out = console.into_inner();
        write_total(&mut out, &report).unwrap();

        assert!(report.timed_out);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Go 4 "));
        assert_eq!(lines[1], "Timed out");
        assert!(lines[2].starts_with("1.0"));
        assert!(lines[2].ends_with("s total"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_detached_hands_sink_back() {
        let pipeline = pipeline(RunMode::Detached, Duration::from_secs(1));

        let (report, memory) = pipeline
            .execute(mock_fetcher(), MemorySink::new("memory"))
            .await
            .unwrap();

        assert!(report.timed_out);
        assert_eq!(memory.outcome_names(), vec!["Go"]);
        assert_eq!(memory.timed_out_count(), 0);
    }
}
