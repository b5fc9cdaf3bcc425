//! ConsoleSink - one human-readable line per notification

use std::io::{self, Stdout, Write};

use contracts::{ContractError, Notification, ResultSink};

/// Sink that prints notifications as text lines
///
/// Lines look like `Go 1234 [0.12s]`, `Bad: Get "...": no such host` and
/// `Timed out`. Writes to stdout unless another writer is supplied.
pub struct ConsoleSink<W: Write + Send = Stdout> {
    name: String,
    writer: W,
}

impl ConsoleSink<Stdout> {
    /// Console sink writing to stdout
    pub fn stdout() -> Self {
        Self::with_writer("console", io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    /// Console sink writing to `writer`
    pub fn with_writer(name: impl Into<String>, writer: W) -> Self {
        Self {
            name: name.into(),
            writer,
        }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ResultSink for ConsoleSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn receive(&mut self, notification: &Notification) -> Result<(), ContractError> {
        writeln!(self.writer, "{notification}")
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        self.writer
            .flush()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }
}
