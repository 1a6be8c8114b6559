//! JSON output formatter for machine-readable results.

use std::io::Write;
use std::io::{self};
use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use stowage_core::CreationReport;
use stowage_core::ExtractionReport;
use stowage_core::UnarchiveReport;

use super::formatter::JobOutcome;
use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct CreationOutput {
    output_path: String,
    files_added: usize,
    directories_seen: usize,
    entries_excluded: usize,
    entries_skipped: usize,
    bytes_written: u64,
    archive_size: u64,
    compression_ratio: f64,
    duration_ms: u128,
    entries: Vec<String>,
}

impl CreationOutput {
    fn new(output: &Path, report: &CreationReport) -> Self {
        Self {
            output_path: output.display().to_string(),
            files_added: report.files_added,
            directories_seen: report.directories_seen,
            entries_excluded: report.entries_excluded,
            entries_skipped: report.entries_skipped,
            bytes_written: report.bytes_written,
            archive_size: report.archive_size,
            compression_ratio: report.compression_ratio(),
            duration_ms: report.duration.as_millis(),
            entries: report.entries.clone(),
        }
    }
}

#[derive(Serialize)]
struct ExtractionOutput {
    files_extracted: usize,
    directories_created: usize,
    bytes_written: u64,
    duration_ms: u128,
}

impl From<&ExtractionReport> for ExtractionOutput {
    fn from(report: &ExtractionReport) -> Self {
        Self {
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            bytes_written: report.bytes_written,
            duration_ms: report.duration.as_millis(),
        }
    }
}

#[derive(Serialize)]
struct UnarchiveOutput {
    output_dir: String,
    extraction: ExtractionOutput,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exported: Vec<String>,
}

impl From<&UnarchiveReport> for UnarchiveOutput {
    fn from(report: &UnarchiveReport) -> Self {
        Self {
            output_dir: report.output.display().to_string(),
            extraction: ExtractionOutput::from(&report.extraction),
            exported: report
                .exported
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum JobOutput {
    Archive {
        name: String,
        #[serde(flatten)]
        result: CreationOutput,
    },
    Unarchive {
        name: String,
        #[serde(flatten)]
        result: UnarchiveOutput,
    },
}

impl From<&JobOutcome> for JobOutput {
    fn from(outcome: &JobOutcome) -> Self {
        match outcome {
            JobOutcome::Archive {
                name,
                output,
                report,
            } => Self::Archive {
                name: name.clone(),
                result: CreationOutput::new(output, report),
            },
            JobOutcome::Unarchive { name, report } => Self::Unarchive {
                name: name.clone(),
                result: UnarchiveOutput::from(report),
            },
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_creation_result(&self, output: &Path, report: &CreationReport) -> Result<()> {
        let data = CreationOutput::new(output, report);
        Self::output(&JsonOutput::success("archive", data))
    }

    fn format_unarchive_result(&self, report: &UnarchiveReport) -> Result<()> {
        let data = UnarchiveOutput::from(report);
        Self::output(&JsonOutput::success("unarchive", data))
    }

    fn format_run_result(&self, outcomes: &[JobOutcome]) -> Result<()> {
        let data: Vec<JobOutput> = outcomes.iter().map(JobOutput::from).collect();
        Self::output(&JsonOutput::success("run", data))
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error("unknown", format!("{error:?}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}
