//! Extraction and unarchive reporting.

use std::path::PathBuf;
use std::time::Duration;

/// Report of one extraction pass.
///
/// `entries` holds entry names exactly as stored in the archive, in stream
/// order, so callers can learn what was produced without rescanning the
/// destination.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Entry names in the order they were read.
    pub entries: Vec<String>,

    /// Regular files written.
    pub files_extracted: usize,

    /// Directory records materialized.
    pub directories_created: usize,

    /// Total file bytes written to disk.
    pub bytes_written: u64,

    /// Duration of the extraction.
    pub duration: Duration,
}

impl ExtractionReport {
    /// Returns the number of entries materialized.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted + self.directories_created
    }
}

/// Report of an unarchive job: extraction plus optional selective export.
#[derive(Debug, Clone, Default)]
pub struct UnarchiveReport {
    /// The underlying extraction pass.
    pub extraction: ExtractionReport,

    /// Destination paths written by the selective exporter, in match order.
    /// Empty when the whole archive was extracted in place.
    pub exported: Vec<PathBuf>,

    /// Directory that holds the result.
    pub output: PathBuf,
}
