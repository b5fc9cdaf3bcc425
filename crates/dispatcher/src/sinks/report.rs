//! ReportSink - appends notifications to a JSON-lines report file

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use contracts::{ContractError, JobOutcome, Notification, ResultSink};
use serde::Serialize;
use tracing::{debug, error, instrument};

use crate::error::DispatcherError;

/// One line of the report file
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ReportLine<'a> {
    Success {
        recorded_at: DateTime<Utc>,
        job: &'a str,
        bytes: u64,
        elapsed_ms: f64,
    },
    Failure {
        recorded_at: DateTime<Utc>,
        job: &'a str,
        error: &'a str,
    },
    TimedOut {
        recorded_at: DateTime<Utc>,
    },
}

impl<'a> ReportLine<'a> {
    fn from_notification(notification: &'a Notification, recorded_at: DateTime<Utc>) -> Self {
        match notification {
            Notification::Outcome(JobOutcome::Success {
                name,
                byte_count,
                elapsed,
            }) => Self::Success {
                recorded_at,
                job: name,
                bytes: *byte_count,
                elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            },
            Notification::Outcome(JobOutcome::Failure { name, error }) => Self::Failure {
                recorded_at,
                job: name,
                error,
            },
            Notification::TimedOut => Self::TimedOut { recorded_at },
        }
    }
}

/// Sink that appends one JSON object per notification to a file
pub struct ReportSink {
    name: String,
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ReportSink {
    /// Open (or create) the report file for appending
    ///
    /// Missing parent directories are created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, DispatcherError> {
        let path = path.as_ref().to_path_buf();
        let name = "report".to_string();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| DispatcherError::sink_creation(&name, e.to_string()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| DispatcherError::sink_creation(&name, e.to_string()))?;

        debug!(path = %path.display(), "Report file opened");
        Ok(Self {
            name,
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Path of the report file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&mut self, notification: &Notification) -> std::io::Result<()> {
        let line = ReportLine::from_notification(notification, Utc::now());
        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")
    }
}

impl ResultSink for ReportSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "report_sink_receive", skip(self, notification), fields(path = %self.path.display()))]
    async fn receive(&mut self, notification: &Notification) -> Result<(), ContractError> {
        self.write_line(notification).map_err(|e| {
            error!(sink = %self.name, error = %e, "Report write failed");
            ContractError::sink_write(&self.name, e.to_string())
        })
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        self.writer
            .flush()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }
}
