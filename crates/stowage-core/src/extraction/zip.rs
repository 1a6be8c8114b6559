//! Zip extraction.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use tracing::debug;
use tracing::trace;
use zip::ZipArchive;

use crate::ArchiveError;
use crate::ExtractionReport;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::extraction::common::create_directory;
use crate::extraction::common::extract_file;
use crate::extraction::path::entry_destination;
use crate::extraction::path::file_destination;

/// Extracts a zip archive into `dest`, in central-directory order.
///
/// Directories are created for explicit directory records and, as a side
/// effect, for every parent implied by a file name.
///
/// # Errors
///
/// Returns an error if the archive cannot be read, an entry would escape
/// `dest`, an entry is a symlink, or a write fails.
pub fn extract_zip(src: &Path, dest: &Path) -> Result<ExtractionReport> {
    let start = Instant::now();
    let file = File::open(src)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    let mut report = ExtractionReport::default();
    let mut buffer = CopyBuffer::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();
        let mode = entry.unix_mode().map(|mode| mode & 0o7777);

        if entry.is_dir() {
            let path = entry_destination(dest, &name)?;
            create_directory(&path, mode)?;
            report.directories_created += 1;
        } else if entry.is_symlink() {
            return Err(ArchiveError::UnknownEntryType {
                name,
                kind: "Symlink".to_string(),
            });
        } else {
            let path = file_destination(dest, &name)?;
            let written = extract_file(&mut entry, &path, mode, &mut buffer)?;
            report.files_extracted += 1;
            report.bytes_written += written;
        }

        trace!(name = %name, "extracted zip entry");
        report.entries.push(name);
    }

    report.duration = start.elapsed();
    debug!(
        dest = %dest.display(),
        entries = report.entries.len(),
        bytes = report.bytes_written,
        "zip extraction finished"
    );
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::ZipTestBuilder;
    use crate::test_utils::write_archive;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extract_zip_implied_directories() {
        let temp = TempDir::new().unwrap();
        let data = ZipTestBuilder::new()
            .add_file("a/b/one.txt", b"one")
            .add_file("a/two.txt", b"two")
            .build();
        let src = write_archive(temp.path(), "a.zip", &data);
        let dest = temp.path().join("out");

        let report = extract_zip(&src, &dest).unwrap();

        assert_eq!(report.files_extracted, 2);
        assert_eq!(report.directories_created, 0);
        assert_eq!(report.entries, vec!["a/b/one.txt", "a/two.txt"]);
        assert_eq!(fs::read_to_string(dest.join("a/b/one.txt")).unwrap(), "one");
        assert_eq!(fs::read_to_string(dest.join("a/two.txt")).unwrap(), "two");
    }

    #[test]
    fn test_extract_zip_explicit_directory() {
        let temp = TempDir::new().unwrap();
        let data = ZipTestBuilder::new().add_directory("empty/").build();
        let src = write_archive(temp.path(), "a.zip", &data);
        let dest = temp.path().join("out");

        let report = extract_zip(&src, &dest).unwrap();
        assert_eq!(report.directories_created, 1);
        assert_eq!(report.entries, vec!["empty/"]);
        assert!(dest.join("empty").is_dir());
    }

    #[test]
    fn test_extract_zip_rejects_traversal() {
        let temp = TempDir::new().unwrap();
        let data = ZipTestBuilder::new()
            .add_file("../evil.txt", b"pwned")
            .build();
        let src = write_archive(temp.path(), "evil.zip", &data);
        let dest = temp.path().join("out");

        let result = extract_zip(&src, &dest);
        assert!(matches!(result, Err(ArchiveError::PathEscape { .. })));
        assert!(!temp.path().join("evil.txt").exists());
    }

    #[test]
    fn test_extract_zip_symlink_is_unknown_type() {
        let temp = TempDir::new().unwrap();
        let data = ZipTestBuilder::new()
            .add_symlink("link", "target.txt")
            .build();
        let src = write_archive(temp.path(), "link.zip", &data);

        let result = extract_zip(&src, &temp.path().join("out"));
        assert!(matches!(
            result,
            Err(ArchiveError::UnknownEntryType { .. })
        ));
    }

    #[test]
    fn test_extract_zip_twice_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let data = ZipTestBuilder::new()
            .add_directory("dir/")
            .add_file("dir/file.txt", b"same")
            .build();
        let src = write_archive(temp.path(), "a.zip", &data);
        let dest = temp.path().join("out");

        extract_zip(&src, &dest).unwrap();
        let report = extract_zip(&src, &dest).unwrap();
        assert_eq!(report.files_extracted, 1);
        assert_eq!(fs::read_to_string(dest.join("dir/file.txt")).unwrap(), "same");
    }

    #[test]
    fn test_extract_zip_not_a_zip() {
        let temp = TempDir::new().unwrap();
        let src = write_archive(temp.path(), "bad.zip", b"PK but not really");

        let result = extract_zip(&src, &temp.path().join("out"));
        assert!(result.is_err());
        assert!(!result.unwrap_err().is_security_violation());
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_zip_applies_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let data = ZipTestBuilder::new()
            .add_file_with_mode("tool", b"bin", 0o750)
            .build();
        let src = write_archive(temp.path(), "mode.zip", &data);
        let dest = temp.path().join("out");

        extract_zip(&src, &dest).unwrap();
        let mode = fs::metadata(dest.join("tool")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }
}
