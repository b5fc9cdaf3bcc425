//! Error types for CLI operations.

use std::path::Path;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Manifest file not found
    #[error("Manifest file not found: {path}")]
    ManifestNotFound { path: String },

    /// Manifest could not be loaded
    #[error("Failed to load manifest {path}: {source}")]
    ManifestLoad {
        path: String,
        #[source]
        source: contracts::ContractError,
    },

    /// Manifest loaded but failed validation
    #[error("Manifest validation failed")]
    ValidationFailed,

    /// Detached run left the shared sink in use
    #[error("Sink still shared after the run")]
    SinkStillShared,
}

impl CliError {
    pub fn manifest_not_found(path: &Path) -> Self {
        Self::ManifestNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn manifest_load(path: &Path, source: contracts::ContractError) -> Self {
        Self::ManifestLoad {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_not_found_display() {
        let err = CliError::manifest_not_found(Path::new("missing.toml"));
        assert_eq!(err.to_string(), "Manifest file not found: missing.toml");
    }
}
