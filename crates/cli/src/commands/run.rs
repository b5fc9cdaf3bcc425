//! `run` command implementation.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config_loader::{ConfigFormat, ConfigLoader};
use contracts::{DispatchConfig, JobDescriptor};
use tracing::{info, warn};

use super::load_manifest;
use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_fetch(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading manifest");

    let (jobs, dispatch) = load_jobs(&args.config)?;
    let dispatch = effective_dispatch(dispatch, args)?;

    info!(
        jobs = jobs.len(),
        mode = ?args.mode,
        timeout_ms = dispatch.timeout_ms,
        max_in_flight = ?dispatch.max_in_flight,
        on_timeout = ?dispatch.on_timeout,
        "Manifest loaded"
    );

    if args.dry_run {
        info!("Dry run mode - manifest is valid, exiting");
        print_run_plan(&jobs, &dispatch);
        return Ok(());
    }

    let pipeline = Pipeline::new(PipelineConfig {
        jobs,
        dispatch,
        mode: args.mode,
        grace: Duration::from_millis(args.grace_ms),
        report_path: args.report.clone(),
        metrics_port: (args.metrics_port != 0).then_some(args.metrics_port),
    });

    tokio::select! {
        result = pipeline.run() => {
            let stats = result.context("Fetch run failed")?;
            if args.summary {
                stats.print_summary();
            }
        }
        _ = shutdown_signal() => {
            warn!("Received shutdown signal, abandoning run");
        }
    }

    Ok(())
}

/// Read jobs and dispatch defaults from the manifest
///
/// JSON-lines manifests are read as a record stream; a malformed record
/// anywhere aborts the run before anything is fetched.
fn load_jobs(path: &Path) -> Result<(Vec<JobDescriptor>, DispatchConfig)> {
    let is_stream = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ConfigFormat::from_extension)
        == Some(ConfigFormat::JsonLines);

    if !is_stream {
        let manifest = load_manifest(path)?;
        return Ok((manifest.descriptors(), manifest.dispatch));
    }

    if !path.exists() {
        return Err(CliError::manifest_not_found(path).into());
    }
    let mut source =
        ConfigLoader::open_record_stream(path).map_err(|e| CliError::manifest_load(path, e))?;
    let jobs = dispatcher::collect_jobs(&mut source)
        .with_context(|| format!("Failed to read jobs from {}", path.display()))?;
    Ok((jobs, DispatchConfig::default()))
}

/// Merge command-line flags into the manifest settings and re-check them
fn effective_dispatch(mut dispatch: DispatchConfig, args: &RunArgs) -> Result<DispatchConfig> {
    apply_overrides(&mut dispatch, args);
    config_loader::validate_dispatch(&dispatch).context("Invalid dispatch settings")?;
    Ok(dispatch)
}

/// Command-line flags win over manifest settings
fn apply_overrides(dispatch: &mut DispatchConfig, args: &RunArgs) {
    if let Some(timeout_ms) = args.timeout_ms {
        info!(timeout_ms, "Overriding timeout from CLI");
        dispatch.timeout_ms = timeout_ms;
    }
    if let Some(limit) = args.max_in_flight {
        info!(limit, "Overriding max in-flight from CLI");
        dispatch.max_in_flight = Some(limit);
    }
    if let Some(policy) = args.on_timeout {
        dispatch.on_timeout = policy.into();
    }
}

/// Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print what a run would do, for dry-run mode
fn print_run_plan(jobs: &[JobDescriptor], dispatch: &DispatchConfig) {
    println!("\n=== Run Plan ===\n");
    println!("Dispatch:");
    println!("  Timeout: {} ms", dispatch.timeout_ms);
    match dispatch.max_in_flight {
        Some(limit) => println!("  Max in flight: {}", limit),
        None => println!("  Max in flight: unbounded"),
    }
    println!("  On timeout: {:?}", dispatch.on_timeout);
    println!("\nJobs ({}):", jobs.len());
    for job in jobs {
        println!("  - {} -> {}", job.name(), job.target());
    }
    println!();
}
