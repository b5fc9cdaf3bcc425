//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::JobManifest;
use serde::Serialize;
use tracing::info;

use super::load_manifest;
use crate::cli::InfoArgs;

/// Manifest info for JSON output
#[derive(Serialize)]
struct ManifestInfo {
    version: String,
    dispatch: DispatchInfo,
    jobs: Vec<JobInfo>,
}

#[derive(Serialize)]
struct DispatchInfo {
    timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_in_flight: Option<usize>,
    on_timeout: String,
}

#[derive(Serialize)]
struct JobInfo {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<i32>,
    url: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading manifest info");

    let manifest = load_manifest(&args.config)?;

    if args.json {
        let info = build_manifest_info(&manifest);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize manifest info")?;
        println!("{}", json);
    } else {
        print_manifest_info(&manifest);
    }

    Ok(())
}

fn build_manifest_info(manifest: &JobManifest) -> ManifestInfo {
    ManifestInfo {
        version: format!("{:?}", manifest.version),
        dispatch: DispatchInfo {
            timeout_ms: manifest.dispatch.timeout_ms,
            max_in_flight: manifest.dispatch.max_in_flight,
            on_timeout: format!("{:?}", manifest.dispatch.on_timeout),
        },
        jobs: manifest
            .jobs
            .iter()
            .map(|job| JobInfo {
                name: job.name.clone(),
                year: job.year,
                url: job.url.clone(),
            })
            .collect(),
    }
}

fn print_manifest_info(manifest: &JobManifest) {
    println!("\n=== Manifest ===\n");
    println!("Version: {:?}", manifest.version);
    println!("\nDispatch:");
    println!("  Timeout: {} ms", manifest.dispatch.timeout_ms);
    match manifest.dispatch.max_in_flight {
        Some(limit) => println!("  Max in flight: {}", limit),
        None => println!("  Max in flight: unbounded"),
    }
    println!("  On timeout: {:?}", manifest.dispatch.on_timeout);

    println!("\nJobs ({}):", manifest.jobs.len());
    for job in &manifest.jobs {
        match job.year {
            Some(year) => println!("  - {} ({}) -> {}", job.name, year, job.url),
            None => println!("  - {} -> {}", job.name, job.url),
        }
    }
    println!();
}
