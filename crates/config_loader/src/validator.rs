//! Manifest validation
//!
//! Rules:
//! - job name non-empty
//! - url is an absolute http/https URL
//! - dispatch.timeout_ms > 0
//! - dispatch.max_in_flight >= 1 when set
//!
//! An empty job list is valid.

use contracts::{ContractError, DispatchConfig, JobManifest, JobRecord};
use validator::Validate;

/// Validate a loaded manifest
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(manifest: &JobManifest) -> Result<(), ContractError> {
    validate_dispatch(&manifest.dispatch)?;
    for (idx, record) in manifest.jobs.iter().enumerate() {
        validate_record(idx, record)?;
    }
    Ok(())
}

/// Validate a single record at position `idx`
pub fn validate_record(idx: usize, record: &JobRecord) -> Result<(), ContractError> {
    if let Err(errors) = record.validate() {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        if let Some((field, errs)) = fields.first() {
            let message = errs
                .first()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .unwrap_or_else(|| "invalid value".to_string());
            return Err(ContractError::config_validation(
                format!("jobs[{idx}].{field}"),
                message,
            ));
        }
    }

    if !has_http_scheme(&record.url) {
        return Err(ContractError::config_validation(
            format!("jobs[{idx}].url"),
            format!("unsupported scheme in '{}', expected http or https", record.url),
        ));
    }

    Ok(())
}

/// Validate dispatch settings on their own
///
/// Used again after command-line overrides are merged in.
pub fn validate_dispatch(dispatch: &DispatchConfig) -> Result<(), ContractError> {
    if dispatch.timeout_ms == 0 {
        return Err(ContractError::config_validation(
            "dispatch.timeout_ms",
            "timeout_ms must be > 0",
        ));
    }

    if dispatch.max_in_flight == Some(0) {
        return Err(ContractError::config_validation(
            "dispatch.max_in_flight",
            "max_in_flight must be >= 1 when set",
        ));
    }

    Ok(())
}

fn has_http_scheme(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
