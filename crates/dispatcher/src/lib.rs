//! # Dispatcher
//!
//! Concurrent fetch dispatch with deadline-bounded collection.
//!
//! Responsible for:
//! - Spawning one worker per job, optionally capped
//! - Collecting outcomes in arrival order until all arrived or the deadline fired
//! - Detaching or cancelling workers left running at the deadline
//! - The sequential and detached run modes

pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod modes;
pub mod session;
pub mod sinks;
pub mod worker;

pub use contracts::{Notification, ResultSink, SessionReport};
pub use dispatcher::{collect_jobs, dispatch_and_collect, Dispatcher, DispatcherBuilder};
pub use error::DispatcherError;
pub use metrics::{MetricsSnapshot, SessionMetrics};
pub use modes::{run_detached, run_sequential};
pub use session::DispatchSession;
pub use sinks::{ConsoleSink, LogSink, MemorySink, ReportSink, Tee};
