//! Tar and gzip-compressed tar extraction.

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use flate2::read::MultiGzDecoder;
use tar::Archive;
use tar::EntryType;
use tracing::debug;
use tracing::trace;

use crate::ArchiveError;
use crate::ExtractionReport;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::extraction::common::create_directory;
use crate::extraction::common::extract_file;
use crate::extraction::path::entry_destination;
use crate::extraction::path::file_destination;

/// Extracts an uncompressed tar archive into `dest`.
///
/// # Errors
///
/// Returns an error if the archive cannot be read, an entry would escape
/// `dest`, an entry is neither a directory nor a regular file, or a write
/// fails.
pub fn extract_tar(src: &Path, dest: &Path) -> Result<ExtractionReport> {
    let file = File::open(src)?;
    extract_tar_stream(BufReader::new(file), dest)
}

/// Extracts a gzip-compressed tar archive into `dest`.
///
/// Concatenated gzip members are read as one stream.
///
/// # Errors
///
/// Same as [`extract_tar`], plus decompression failures.
pub fn extract_tar_gz(src: &Path, dest: &Path) -> Result<ExtractionReport> {
    let file = File::open(src)?;
    extract_tar_stream(MultiGzDecoder::new(BufReader::new(file)), dest)
}

/// Extracts tar records read from `reader` into `dest`, in stream order.
///
/// # Errors
///
/// See [`extract_tar`].
pub fn extract_tar_stream<R: Read>(reader: R, dest: &Path) -> Result<ExtractionReport> {
    let start = Instant::now();
    let mut archive = Archive::new(reader);
    let mut report = ExtractionReport::default();
    let mut buffer = CopyBuffer::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = String::from_utf8(entry.path_bytes().into_owned()).map_err(|e| {
            ArchiveError::InvalidArchive(format!(
                "entry name is not valid UTF-8: {}",
                String::from_utf8_lossy(e.as_bytes())
            ))
        })?;
        let kind = entry.header().entry_type();
        let mode = entry.header().mode().ok();

        match kind {
            EntryType::XGlobalHeader => {
                trace!(name = %name, "skipping pax global header");
                continue;
            }
            EntryType::Directory => {
                let path = entry_destination(dest, &name)?;
                create_directory(&path, mode)?;
                report.directories_created += 1;
            }
            EntryType::Regular | EntryType::Continuous => {
                let path = file_destination(dest, &name)?;
                let written = extract_file(&mut entry, &path, mode, &mut buffer)?;
                report.files_extracted += 1;
                report.bytes_written += written;
            }
            other => {
                return Err(ArchiveError::UnknownEntryType {
                    name,
                    kind: format!("{other:?}"),
                });
            }
        }

        trace!(name = %name, "extracted tar entry");
        report.entries.push(name);
    }

    report.duration = start.elapsed();
    debug!(
        dest = %dest.display(),
        entries = report.entries.len(),
        bytes = report.bytes_written,
        "tar extraction finished"
    );
    Ok(report)
}
