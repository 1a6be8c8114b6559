//! Archive creation reporting.

use std::time::Duration;

/// Report of one archive creation.
///
/// # Examples
///
/// ```
/// use stowage_core::creation::CreationReport;
///
/// let mut report = CreationReport::default();
/// report.bytes_written = 1000;
/// report.archive_size = 250;
///
/// assert_eq!(report.compression_ratio(), 4.0);
/// assert_eq!(report.total_entries(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CreationReport {
    /// Regular files written to the archive.
    pub files_added: usize,

    /// Directories visited (written as records only by tar).
    pub directories_seen: usize,

    /// Entries dropped by the exclusion set. A pruned directory counts once.
    pub entries_excluded: usize,

    /// Special files (sockets, devices, FIFOs) that were skipped.
    pub entries_skipped: usize,

    /// Uncompressed content bytes read from source files.
    pub bytes_written: u64,

    /// Size of the finished archive on disk.
    pub archive_size: u64,

    /// Elapsed time for the whole operation.
    pub duration: Duration,

    /// Archive-relative names in the order they were handed to the writer.
    pub entries: Vec<String>,
}

impl CreationReport {
    /// Returns the number of entries handed to the writer.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.files_added + self.directories_seen
    }

    /// Returns uncompressed bytes divided by archive size, or 0.0 when either
    /// is zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compression_ratio(&self) -> f64 {
        if self.archive_size == 0 || self.bytes_written == 0 {
            return 0.0;
        }
        self.bytes_written as f64 / self.archive_size as f64
    }
}
