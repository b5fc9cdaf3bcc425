//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_fetch;
pub use validate::run_validate;

use std::path::Path;

use contracts::JobManifest;

use crate::error::{CliError, Result};

/// Load a manifest, mapping failures to CLI errors
pub(crate) fn load_manifest(path: &Path) -> Result<JobManifest> {
    if !path.exists() {
        return Err(CliError::manifest_not_found(path));
    }
    config_loader::ConfigLoader::load_from_path(path)
        .map_err(|e| CliError::manifest_load(path, e))
}
