//! Error types for archive creation and extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ArchiveError`.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors that can occur while building or unpacking an archive.
///
/// Every variant is fatal to the operation that produced it: nothing is
/// retried internally and no partial result is reported as success.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is missing a required field or holds an invalid value.
    #[error("invalid configuration: {reason}")]
    Configuration {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// Archive format is unsupported or could not be inferred.
    #[error("unsupported archive format: {name}")]
    UnsupportedFormat {
        /// The file name or format value that was rejected.
        name: String,
    },

    /// A source path handed to the packer does not exist.
    #[error("source path not found: {path}")]
    SourceNotFound {
        /// The missing source path.
        path: PathBuf,
    },

    /// A source entry lies outside the working root, so it has no
    /// archive-relative name.
    #[error("source {path} is not under working root {root}")]
    SourceOutsideRoot {
        /// The offending source path.
        path: PathBuf,
        /// The working root names are computed against.
        root: PathBuf,
    },

    /// Archive record is neither a directory nor a regular file.
    #[error("unknown entry type {kind} for entry {name}")]
    UnknownEntryType {
        /// Entry name as stored in the archive.
        name: String,
        /// Human-readable description of the record type.
        kind: String,
    },

    /// Archive entry would resolve outside the destination root.
    #[error("entry escapes destination root: {name}")]
    PathEscape {
        /// Entry name as stored in the archive.
        name: String,
    },

    /// Archive structure is corrupted or unreadable.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// An archive writer session was used after it was finished.
    #[error("archive writer already finished")]
    WriterFinished,

    /// A selective-export glob pattern could not be parsed.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ArchiveError {
    /// Returns `true` if this error was raised to stop an entry from writing
    /// outside its destination.
    ///
    /// # Examples
    ///
    /// ```
    /// use stowage_core::ArchiveError;
    ///
    /// let err = ArchiveError::PathEscape {
    ///     name: "../evil".to_string(),
    /// };
    /// assert!(err.is_security_violation());
    /// assert!(!ArchiveError::WriterFinished.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Self::PathEscape { .. })
    }

    /// Returns `true` if this error is detected from configuration alone,
    /// before any archive I/O starts.
    ///
    /// # Examples
    ///
    /// ```
    /// use stowage_core::ArchiveError;
    ///
    /// let err = ArchiveError::UnsupportedFormat {
    ///     name: "x.rar".to_string(),
    /// };
    /// assert!(err.is_configuration_error());
    /// ```
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. }
                | Self::UnsupportedFormat { .. }
                | Self::SourceNotFound { .. }
                | Self::SourceOutsideRoot { .. }
                | Self::InvalidPattern { .. }
        )
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}

impl From<walkdir::Error> for ArchiveError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(|p| p.display().to_string());
        match err.into_io_error() {
            Some(io) => Self::Io(io),
            None => Self::Io(std::io::Error::other(format!(
                "filesystem loop detected while walking {}",
                path.unwrap_or_default()
            ))),
        }
    }
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => Self::Io(io),
            other => Self::InvalidArchive(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ArchiveError::UnsupportedFormat {
            name: "x.rar".to_string(),
        };
        assert_eq!(err.to_string(), "unsupported archive format: x.rar");
    }

    #[test]
    fn test_path_escape_error() {
        let err = ArchiveError::PathEscape {
            name: "../evil".to_string(),
        };
        assert!(err.to_string().contains("escapes destination"));
        assert!(err.to_string().contains("../evil"));
        assert!(err.is_security_violation());
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn test_unknown_entry_type_error() {
        let err = ArchiveError::UnknownEntryType {
            name: "link".to_string(),
            kind: "symlink".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("symlink"));
        assert!(display.contains("link"));
        assert!(!err.is_security_violation());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ArchiveError = io_err.into();
        assert!(matches!(err, ArchiveError::Io(_)));
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn test_configuration_errors_classified() {
        assert!(ArchiveError::config("missing out").is_configuration_error());
        assert!(
            ArchiveError::SourceNotFound {
                path: PathBuf::from("missing")
            }
            .is_configuration_error()
        );
        assert!(
            ArchiveError::InvalidPattern {
                pattern: "[".to_string(),
                reason: "unclosed".to_string()
            }
            .is_configuration_error()
        );
        assert!(!ArchiveError::InvalidArchive("bad".to_string()).is_configuration_error());
        assert!(!ArchiveError::WriterFinished.is_configuration_error());
    }

    #[test]
    fn test_zip_io_error_unwrapped() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated");
        let err: ArchiveError = zip::result::ZipError::Io(io_err).into();
        assert!(matches!(err, ArchiveError::Io(_)));
    }

    #[test]
    fn test_zip_structure_error_is_invalid_archive() {
        let err: ArchiveError = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(err, ArchiveError::InvalidArchive(_)));
    }
}
