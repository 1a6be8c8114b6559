//! Output formatter trait for CLI results.

use std::path::Path;
use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;
use stowage_core::CreationReport;
use stowage_core::UnarchiveReport;

/// Result of one build file job.
#[derive(Debug)]
pub enum JobOutcome {
    Archive {
        name: String,
        output: PathBuf,
        report: CreationReport,
    },
    Unarchive {
        name: String,
        report: UnarchiveReport,
    },
}

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the result of packing one archive
    fn format_creation_result(&self, output: &Path, report: &CreationReport) -> Result<()>;

    /// Format the result of one unarchive run
    fn format_unarchive_result(&self, report: &UnarchiveReport) -> Result<()>;

    /// Format the results of a build file run
    fn format_run_result(&self, outcomes: &[JobOutcome]) -> Result<()>;

    /// Format error message
    fn format_error(&self, error: &anyhow::Error);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> JsonOutput<()> {
        JsonOutput {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
