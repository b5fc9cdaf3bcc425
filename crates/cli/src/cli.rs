//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::TimeoutPolicy;
use std::path::PathBuf;

/// fetch-timer - fetch many URLs concurrently, give up at a deadline
#[derive(Parser, Debug)]
#[command(
    name = "fetch-timer",
    author,
    version,
    about = "Concurrent fetching with a collection deadline",
    long_about = "Fetches every job of a manifest concurrently and reports each result as it \n\
                  arrives. Collection stops at a fixed deadline; jobs still running at that \n\
                  point are reported as a single 'Timed out' line."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FETCH_TIMER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "FETCH_TIMER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every job of a manifest
    Run(RunArgs),

    /// Validate a manifest without fetching anything
    Validate(ValidateArgs),

    /// Display manifest information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to the job manifest (TOML, JSON or JSON lines)
    #[arg(short, long, default_value = "jobs.jsonl", env = "FETCH_TIMER_CONFIG")]
    pub config: PathBuf,

    /// How jobs are executed
    #[arg(long, value_enum, default_value = "concurrent", env = "FETCH_TIMER_MODE")]
    pub mode: RunMode,

    /// Override the collection deadline in milliseconds
    #[arg(long, env = "FETCH_TIMER_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Override the maximum number of concurrent fetches
    #[arg(long, env = "FETCH_TIMER_MAX_IN_FLIGHT")]
    pub max_in_flight: Option<usize>,

    /// Override what happens to unfinished fetches at the deadline
    #[arg(long, value_enum, env = "FETCH_TIMER_ON_TIMEOUT")]
    pub on_timeout: Option<OnTimeout>,

    /// Wait period of the detached mode in milliseconds
    #[arg(long, default_value = "10000", env = "FETCH_TIMER_GRACE_MS")]
    pub grace_ms: u64,

    /// Append every result to this JSON-lines report file
    #[arg(long, env = "FETCH_TIMER_REPORT")]
    pub report: Option<PathBuf>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "FETCH_TIMER_METRICS_PORT")]
    pub metrics_port: u16,

    /// Print aggregated statistics after the run
    #[arg(long)]
    pub summary: bool,

    /// Load and validate the manifest, then exit without fetching
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the manifest to validate
    #[arg(short, long, default_value = "jobs.jsonl")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to the manifest
    #[arg(short, long, default_value = "jobs.jsonl")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execution strategy
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunMode {
    /// One fetch at a time, in manifest order
    Sequential,
    /// Spawn everything, wait a fixed grace period
    Detached,
    /// Spawn everything, collect until done or the deadline
    #[default]
    Concurrent,
}

/// Timeout policy as accepted on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnTimeout {
    /// Leave unfinished fetches running
    Detach,
    /// Cancel unfinished fetches
    Cancel,
}

impl From<OnTimeout> for TimeoutPolicy {
    fn from(value: OnTimeout) -> Self {
        match value {
            OnTimeout::Detach => TimeoutPolicy::Detach,
            OnTimeout::Cancel => TimeoutPolicy::Cancel,
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(value: LogFormat) -> Self {
        match value {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_args() {
        let cli = Cli::parse_from([
            "fetch-timer",
            "-v",
            "run",
            "-c",
            "jobs.toml",
            "--timeout-ms",
            "500",
            "--on-timeout",
            "cancel",
            "--mode",
            "sequential",
        ]);

        assert_eq!(cli.verbose, 1);
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.config, PathBuf::from("jobs.toml"));
        assert_eq!(args.timeout_ms, Some(500));
        assert_eq!(args.on_timeout, Some(OnTimeout::Cancel));
        assert_eq!(args.mode, RunMode::Sequential);
        assert_eq!(args.max_in_flight, None);
        assert_eq!(args.grace_ms, 10_000);
    }
}
