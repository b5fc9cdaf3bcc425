//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::JobManifest;
use serde::Serialize;
use tracing::info;

use super::load_manifest;
use crate::cli::ValidateArgs;
use crate::error::CliError;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ManifestSummary>,
}

#[derive(Serialize)]
struct ManifestSummary {
    version: String,
    job_count: usize,
    timeout_ms: u64,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating manifest");

    let config_path = args.config.display().to_string();
    let result = match load_manifest(&args.config) {
        Ok(manifest) => valid_result(config_path, &manifest),
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    };

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        Err(CliError::ValidationFailed.into())
    }
}

fn valid_result(config_path: String, manifest: &JobManifest) -> ValidationResult {
    let warnings = collect_warnings(manifest);
    ValidationResult {
        valid: true,
        config_path,
        error: None,
        warnings: (!warnings.is_empty()).then_some(warnings),
        summary: Some(ManifestSummary {
            version: format!("{:?}", manifest.version),
            job_count: manifest.jobs.len(),
            timeout_ms: manifest.dispatch.timeout_ms,
        }),
    }
}

/// Collect non-fatal manifest issues
fn collect_warnings(manifest: &JobManifest) -> Vec<String> {
    let mut warnings = Vec::new();

    if manifest.jobs.is_empty() {
        warnings.push("No jobs - a run will fetch nothing".to_string());
    }

    let mut seen = std::collections::HashSet::new();
    for job in &manifest.jobs {
        if !seen.insert(job.url.as_str()) {
            warnings.push(format!("Target '{}' appears more than once", job.url));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Manifest is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Jobs: {}", summary.job_count);
            println!("  Timeout: {} ms", summary.timeout_ms);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Manifest is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
