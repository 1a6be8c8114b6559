//! Error conversion utilities for CLI.
//!
//! Converts stowage-core's typed errors (thiserror) into user-facing errors
//! (anyhow) that name the job subject and carry a `HINT:` line where there is
//! something the user can do about it.

use std::path::Path;

use anyhow::anyhow;
use stowage_core::ArchiveError;

/// Converts an `ArchiveError` raised while working on `subject`.
pub fn convert_archive_error(err: ArchiveError, subject: &Path) -> anyhow::Error {
    match err {
        ArchiveError::PathEscape { name } => anyhow!(
            "Security violation: Archive '{}' has entry '{name}' that escapes the output directory\n\
             HINT: This archive may be malicious. Do not extract from untrusted sources.",
            subject.display()
        ),
        ArchiveError::UnknownEntryType { name, kind } => anyhow!(
            "Unsupported entry in '{}': '{name}' is a {kind} record\n\
             HINT: Only regular files and directories can be extracted.",
            subject.display()
        ),
        ArchiveError::UnsupportedFormat { name } => anyhow!(
            "Archive format not supported: {name}\n\
             HINT: Supported formats: zip, tar, tar.gz (tgz); pass --type to choose explicitly.",
        ),
        ArchiveError::Configuration { reason } => anyhow!(
            "Invalid configuration for '{}': {reason}",
            subject.display()
        ),
        ArchiveError::SourceNotFound { path } => anyhow!(
            "Source not found: {}\n\
             HINT: Source paths resolve against the working root (--root).",
            path.display()
        ),
        ArchiveError::SourceOutsideRoot { path, root } => anyhow!(
            "Source '{}' is outside the working root '{}'\n\
             HINT: Entry names are computed relative to the root; pass a --root that contains every source.",
            path.display(),
            root.display()
        ),
        ArchiveError::InvalidPattern { pattern, reason } => anyhow!(
            "Invalid export pattern '{pattern}': {reason}\n\
             HINT: Patterns are relative globs such as 'lib/*.so' or 'include/**'."
        ),
        ArchiveError::InvalidArchive(reason) => anyhow!(
            "Invalid archive '{}': {reason}\n\
             HINT: The archive may be corrupted or malformed.",
            subject.display()
        ),
        ArchiveError::Io(io_err) => anyhow!(
            "I/O error while processing '{}': {io_err}",
            subject.display()
        ),
        ArchiveError::WriterFinished => anyhow::Error::from(err)
            .context(format!("Error processing archive '{}'", subject.display())),
    }
}

/// Converts the error side of a core result.
pub fn add_archive_context<T>(
    result: Result<T, ArchiveError>,
    subject: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_archive_error(e, subject))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_convert_path_escape() {
        let err = ArchiveError::PathEscape {
            name: "../../etc/passwd".to_string(),
        };
        let msg = format!("{:?}", convert_archive_error(err, Path::new("evil.tar")));
        assert!(msg.contains("Security violation"));
        assert!(msg.contains("evil.tar"));
        assert!(msg.contains("../../etc/passwd"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_unknown_entry_type() {
        let err = ArchiveError::UnknownEntryType {
            name: "link".to_string(),
            kind: "Symlink".to_string(),
        };
        let msg = format!("{:?}", convert_archive_error(err, Path::new("a.zip")));
        assert!(msg.contains("Symlink"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_unsupported_format() {
        let err = ArchiveError::UnsupportedFormat {
            name: "data.rar".to_string(),
        };
        let msg = format!("{:?}", convert_archive_error(err, Path::new("data.rar")));
        assert!(msg.contains("data.rar"));
        assert!(msg.contains("--type"));
    }

    #[test]
    fn test_convert_source_outside_root() {
        let err = ArchiveError::SourceOutsideRoot {
            path: PathBuf::from("/tmp/elsewhere"),
            root: PathBuf::from("/work"),
        };
        let msg = format!("{:?}", convert_archive_error(err, Path::new("out.tar")));
        assert!(msg.contains("/tmp/elsewhere"));
        assert!(msg.contains("--root"));
    }

    #[test]
    fn test_convert_io_error() {
        let err = ArchiveError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        let msg = format!("{:?}", convert_archive_error(err, Path::new("out.zip")));
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("out.zip"));
    }

    #[test]
    fn test_add_archive_context() {
        let result: Result<(), ArchiveError> = Err(ArchiveError::InvalidArchive(
            "truncated central directory".to_string(),
        ));
        let err = add_archive_context(result, Path::new("broken.zip")).unwrap_err();
        let msg = format!("{err:?}");
        assert!(msg.contains("broken.zip"));
        assert!(msg.contains("truncated central directory"));
    }
}
