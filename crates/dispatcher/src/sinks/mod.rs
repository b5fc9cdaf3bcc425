//! Sink implementations
//!
//! Contains ConsoleSink, LogSink, ReportSink, MemorySink and the Tee combinator.

mod console;
mod log;
mod memory;
mod report;
mod tee;

pub use self::console::ConsoleSink;
pub use self::log::LogSink;
pub use self::memory::MemorySink;
pub use self::report::ReportSink;
pub use self::tee::Tee;
