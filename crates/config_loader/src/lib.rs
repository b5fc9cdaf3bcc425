//! # Config Loader
//!
//! Job manifest loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML / JSON manifests and JSON record streams
//! - Validate records and dispatch settings
//! - Produce a `JobManifest` or a streaming `JobSource`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let manifest = ConfigLoader::load_from_path(Path::new("jobs.toml")).unwrap();
//! println!("Jobs: {}", manifest.jobs.len());
//! ```

mod parser;
mod source;
mod validator;

pub use contracts::JobManifest;
pub use parser::ConfigFormat;
pub use source::RecordStreamSource;
pub use validator::validate_dispatch;

use contracts::ContractError;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Manifest loader
///
/// Provides static methods to load manifests from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a manifest from file path
    ///
    /// Automatically detects format from file extension
    /// (.toml / .json / .jsonl / .ndjson).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<JobManifest, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a manifest from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<JobManifest, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Open a record stream file as a lazily-read job source
    pub fn open_record_stream(
        path: &Path,
    ) -> Result<RecordStreamSource<BufReader<File>>, ContractError> {
        let file = File::open(path)?;
        Ok(RecordStreamSource::new(BufReader::new(file)))
    }

    /// Serialize a manifest to TOML string
    pub fn to_toml(manifest: &JobManifest) -> Result<String, ContractError> {
        toml::to_string_pretty(manifest)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a manifest to JSON string
    pub fn to_json(manifest: &JobManifest) -> Result<String, ContractError> {
        serde_json::to_string_pretty(manifest)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer manifest format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported manifest format: .{ext}"))
        })
    }

    /// Read manifest file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate manifest content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<JobManifest, ContractError> {
        let manifest = parser::parse(content, format)?;
        validator::validate(&manifest)?;
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::JobSource;
    use std::io::Write;

    const MINIMAL_TOML: &str = r#"
[dispatch]
timeout_ms = 1500

[[jobs]]
name = "Go"
year = 2009
url = "http://golang.org/"

[[jobs]]
name = "Python"
year = 1991
url = "http://python.org/"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let manifest = result.unwrap();
        assert_eq!(manifest.dispatch.timeout_ms, 1500);
        assert_eq!(manifest.jobs[0].name, "Go");
    }

    #[test]
    fn test_round_trip_toml() {
        let manifest = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&manifest).unwrap();
        let manifest2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(manifest.jobs, manifest2.jobs);
        assert_eq!(manifest.dispatch, manifest2.dispatch);
    }

    #[test]
    fn test_toml_to_json() {
        let manifest = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&manifest).unwrap();
        let manifest2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(manifest.jobs, manifest2.jobs);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[[jobs]]
name = "Go"
url = "golang.org"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("jobs[0].url"));
    }

    #[test]
    fn test_load_from_path_detects_format() {
        let mut file = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
        writeln!(
            file,
            r#"{{"Name": "Go", "Year": 2009, "URL": "http://golang.org/"}}"#
        )
        .unwrap();

        let manifest = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(manifest.jobs.len(), 1);
        assert_eq!(manifest.jobs[0].year, Some(2009));
    }

    #[test]
    fn test_load_from_path_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported manifest format"));
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let err = ConfigLoader::load_from_path(Path::new("/nonexistent/jobs.toml")).unwrap_err();
        assert!(matches!(err, ContractError::Io(_)));
    }

    #[test]
    fn test_open_record_stream() {
        let mut file = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
        writeln!(file, r#"{{"name": "a", "url": "http://a.example/"}}"#).unwrap();
        writeln!(file, r#"{{"name": "b", "url": "http://b.example/"}}"#).unwrap();

        let mut source = ConfigLoader::open_record_stream(file.path()).unwrap();
        assert_eq!(source.next_job().unwrap().unwrap().name(), "a");
        assert_eq!(source.next_job().unwrap().unwrap().name(), "b");
        assert!(source.next_job().unwrap().is_none());
    }
}
