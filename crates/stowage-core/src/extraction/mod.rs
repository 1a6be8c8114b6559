//! Archive extraction.
//!
//! Each extractor drains its archive in stream order and rebuilds the tree
//! under a destination root. Entry names are untrusted: any name that would
//! resolve outside the root aborts the extraction.

pub(crate) mod common;
pub mod path;
pub mod tar;
pub mod zip;

use std::fs;
use std::path::Path;

use tracing::info;

use crate::ExtractionReport;
use crate::Result;
use crate::formats::ArchiveFormat;
use crate::formats::detect_format;

pub use self::tar::extract_tar;
pub use self::tar::extract_tar_gz;
pub use self::zip::extract_zip;

/// Extractor entry point shared by every format.
pub type Extractor = fn(&Path, &Path) -> Result<ExtractionReport>;

/// Returns the extractor that reads `format`.
#[must_use]
pub fn extractor_for(format: ArchiveFormat) -> Extractor {
    match format {
        ArchiveFormat::Zip => extract_zip,
        ArchiveFormat::Tar => extract_tar,
        ArchiveFormat::TarGz => extract_tar_gz,
    }
}

/// Extracts `src` into `dest`, choosing the format from the file name.
///
/// `dest` and its ancestors are created if missing. Extracting the same
/// archive twice into the same destination succeeds both times.
///
/// # Errors
///
/// Returns [`ArchiveError::UnsupportedFormat`](crate::ArchiveError::UnsupportedFormat)
/// before any I/O if the suffix is not recognized, and otherwise any error
/// raised by the format's extractor.
///
/// # Examples
///
/// ```no_run
/// use stowage_core::extract_archive;
/// use std::path::Path;
///
/// let report = extract_archive(Path::new("deps.tar.gz"), Path::new("third_party"))?;
/// for name in &report.entries {
///     println!("{name}");
/// }
/// # Ok::<(), stowage_core::ArchiveError>(())
/// ```
pub fn extract_archive(src: &Path, dest: &Path) -> Result<ExtractionReport> {
    let format = detect_format(src)?;
    fs::create_dir_all(dest)?;

    let report = extractor_for(format)(src, dest)?;

    info!(
        archive = %src.display(),
        dest = %dest.display(),
        format = %format,
        files = report.files_extracted,
        directories = report.directories_created,
        "archive extracted"
    );
    Ok(report)
}
