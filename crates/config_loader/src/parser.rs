//! Manifest parsing
//!
//! TOML and JSON manifests carry a `[dispatch]` table plus a job list; the
//! JSON-lines format is a bare stream of concatenated job records.

use contracts::{ContractError, JobManifest, JobRecord};

/// Manifest file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML manifest (recommended)
    Toml,
    /// JSON manifest object
    Json,
    /// Stream of JSON job records, one value after another
    JsonLines,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "jsonl" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Parse a TOML manifest
pub fn parse_toml(content: &str) -> Result<JobManifest, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a JSON manifest object
pub fn parse_json(content: &str) -> Result<JobManifest, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a stream of JSON job records
///
/// The first malformed record fails the whole stream.
pub fn parse_json_lines(content: &str) -> Result<JobManifest, ContractError> {
    let records = serde_json::Deserializer::from_str(content)
        .into_iter::<JobRecord>()
        .enumerate()
        .map(|(idx, record)| record.map_err(|e| record_error(idx, e)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(JobManifest::from_records(records))
}

/// Parse content according to `format`
pub fn parse(content: &str, format: ConfigFormat) -> Result<JobManifest, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
        ConfigFormat::JsonLines => parse_json_lines(content),
    }
}

pub(crate) fn record_error(idx: usize, e: serde_json::Error) -> ContractError {
    ContractError::ConfigParse {
        message: format!("record {idx}: JSON parse error: {e}"),
        source: Some(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::TimeoutPolicy;

    #[test]
    fn test_parse_toml_manifest() {
        let content = r#"
[dispatch]
timeout_ms = 2500
max_in_flight = 8
on_timeout = "cancel"

[[jobs]]
name = "Go"
year = 2009
url = "http://golang.org/"

[[jobs]]
name = "Rust"
url = "https://www.rust-lang.org/"
"#;
        let manifest = parse_toml(content).unwrap();
        assert_eq!(manifest.dispatch.timeout_ms, 2500);
        assert_eq!(manifest.dispatch.max_in_flight, Some(8));
        assert_eq!(manifest.dispatch.on_timeout, TimeoutPolicy::Cancel);
        assert_eq!(manifest.jobs.len(), 2);
        assert_eq!(manifest.jobs[1].year, None);
    }

    #[test]
    fn test_parse_json_manifest_defaults() {
        let content = r#"{ "jobs": [{ "name": "Go", "url": "http://golang.org/" }] }"#;
        let manifest = parse_json(content).unwrap();
        assert_eq!(manifest.dispatch, Default::default());
        assert_eq!(manifest.jobs.len(), 1);
    }

    #[test]
    fn test_parse_json_lines_capitalised_records() {
        let content = r#"{"Name": "Python", "Year": 1991, "URL": "http://python.org/"}
{"Name": "Ruby", "Year": 1995, "URL": "http://ruby-lang.org/"}
{"Name": "Scala", "Year": 2003, "URL": "http://scala-lang.org/"}
{"Name": "Go", "Year": 2009, "URL": "http://golang.org/"}
"#;
        let manifest = parse_json_lines(content).unwrap();
        let names: Vec<_> = manifest.jobs.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["Python", "Ruby", "Scala", "Go"]);
    }

    #[test]
    fn test_parse_json_lines_without_newlines() {
        let content = r#"{"name":"a","url":"http://a.example/"}{"name":"b","url":"http://b.example/"}"#;
        let manifest = parse_json_lines(content).unwrap();
        assert_eq!(manifest.jobs.len(), 2);
    }

    #[test]
    fn test_parse_json_lines_empty() {
        let manifest = parse_json_lines("  \n").unwrap();
        assert!(manifest.jobs.is_empty());
    }

    #[test]
    fn test_parse_json_lines_malformed_record_is_fatal() {
        let content = r#"{"name":"a","url":"http://a.example/"}
{"name": 42}
"#;
        let err = parse_json_lines(content).unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
        assert!(err.to_string().contains("record 1"));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let err = parse_toml("invalid toml [[[").unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(
            ConfigFormat::from_extension("ndjson"),
            Some(ConfigFormat::JsonLines)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
