//! Job data model - Job Source output
//!
//! `JobRecord` is the on-disk shape, `JobDescriptor` the unit of work a
//! worker executes, `JobManifest` a complete loaded job list.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::DispatchConfig;

/// Manifest version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ManifestVersion {
    #[default]
    V1,
}

/// A unit of input work: a name and the target to fetch
///
/// Immutable once created. Duplicates are permitted and executed
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobDescriptor {
    name: String,
    target: String,
}

impl JobDescriptor {
    /// Create a new descriptor
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
        }
    }

    /// Job name, echoed in every outcome
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetch target address
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// One record of a job manifest
///
/// Accepts both lower-case keys and the capitalised `Name` / `Year` / `URL`
/// spelling of the language list this tool was first pointed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct JobRecord {
    /// Job name
    #[serde(alias = "Name")]
    #[validate(length(min = 1, message = "job name cannot be empty"))]
    pub name: String,

    /// Informational year, ignored by the dispatcher
    #[serde(default, alias = "Year", skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Target URL
    #[serde(alias = "URL", alias = "Url", alias = "target")]
    #[validate(url(message = "url is not a valid absolute URL"))]
    pub url: String,
}

impl JobRecord {
    /// Build the descriptor a worker executes
    pub fn to_descriptor(&self) -> JobDescriptor {
        JobDescriptor::new(&self.name, &self.url)
    }
}

impl From<JobRecord> for JobDescriptor {
    fn from(record: JobRecord) -> Self {
        JobDescriptor::new(record.name, record.url)
    }
}

/// Complete loaded job list plus dispatch settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobManifest {
    /// Manifest version
    #[serde(default)]
    pub version: ManifestVersion,

    /// Dispatch session settings
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Job records, in input order
    #[serde(default)]
    pub jobs: Vec<JobRecord>,
}

impl JobManifest {
    /// Manifest with default dispatch settings
    pub fn from_records(jobs: Vec<JobRecord>) -> Self {
        Self {
            jobs,
            ..Self::default()
        }
    }

    /// Descriptors in input order
    pub fn descriptors(&self) -> Vec<JobDescriptor> {
        self.jobs.iter().map(JobRecord::to_descriptor).collect()
    }
}
