//! Job configuration for archive and unarchive operations.
//!
//! Both structs deserialize straight from a build file table and can also be
//! assembled in code with `with_*` setters. Call `validate()` before handing
//! a configuration to [`create_archive`](crate::create_archive) or
//! [`unarchive`](crate::unarchive); both call it again themselves.

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::ArchiveError;
use crate::Result;
use crate::creation::writer::DEFAULT_COMPRESSION_LEVEL;
use crate::creation::writer::WriterOptions;
use crate::formats::ArchiveFormat;
use crate::formats::detect_format;

/// Returns `true` if `value` names a build target rather than a path.
///
/// # Examples
///
/// ```
/// use stowage_core::config::is_target_reference;
///
/// assert!(is_target_reference(":bundle"));
/// assert!(is_target_reference("//pkg:bundle"));
/// assert!(!is_target_reference("dist/bundle"));
/// ```
#[must_use]
pub fn is_target_reference(value: &str) -> bool {
    value.starts_with(':') || value.starts_with("//")
}

/// Configuration of one archive-creation job.
///
/// # Examples
///
/// ```
/// use stowage_core::ArchiveConfig;
/// use stowage_core::ArchiveFormat;
///
/// let config = ArchiveConfig::new("bundle")
///     .with_source("src")
///     .with_source("Cargo.toml")
///     .with_out("dist/bundle.zip")
///     .with_exclusions(vec!["target".to_string()]);
///
/// assert_eq!(config.resolved_format()?, ArchiveFormat::Zip);
/// config.validate()?;
/// # Ok::<(), stowage_core::ArchiveError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Job name, used in logs and to select jobs from a build file.
    pub name: String,

    /// Files or directories to pack.
    pub srcs: Vec<PathBuf>,

    /// Output format. Inferred from `out` when absent.
    pub format: Option<ArchiveFormat>,

    /// Archive file to write.
    pub out: Option<PathBuf>,

    /// Inline substring exclusion patterns.
    pub exclusions: Vec<String>,

    /// File holding more exclusion patterns, one per line.
    pub exclusion_file: Option<PathBuf>,

    /// Deflate level 1-9 for zip output.
    pub compression_level: Option<u8>,
}

impl ArchiveConfig {
    /// Creates an empty configuration named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Replaces the source list.
    #[must_use]
    pub fn with_srcs(mut self, srcs: Vec<PathBuf>) -> Self {
        self.srcs = srcs;
        self
    }

    /// Appends one source.
    #[must_use]
    pub fn with_source(mut self, src: impl Into<PathBuf>) -> Self {
        self.srcs.push(src.into());
        self
    }

    /// Sets an explicit output format.
    #[must_use]
    pub fn with_format(mut self, format: Option<ArchiveFormat>) -> Self {
        self.format = format;
        self
    }

    /// Sets the output path.
    #[must_use]
    pub fn with_out(mut self, out: impl Into<PathBuf>) -> Self {
        self.out = Some(out.into());
        self
    }

    /// Sets the inline exclusion patterns.
    #[must_use]
    pub fn with_exclusions(mut self, exclusions: Vec<String>) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Sets the exclusion file.
    #[must_use]
    pub fn with_exclusion_file(mut self, path: Option<PathBuf>) -> Self {
        self.exclusion_file = path;
        self
    }

    /// Sets the compression level. Range is checked by [`Self::validate`].
    #[must_use]
    pub fn with_compression_level(mut self, level: Option<u8>) -> Self {
        self.compression_level = level;
        self
    }

    /// Returns the output path.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `out` is not set.
    pub fn output(&self) -> Result<&Path> {
        self.out
            .as_deref()
            .ok_or_else(|| ArchiveError::config(format!("archive '{}' has no output", self.name)))
    }

    /// Returns the explicit format, or the one implied by the output name.
    ///
    /// # Errors
    ///
    /// Returns an error if `out` is missing or its suffix is not recognized.
    pub fn resolved_format(&self) -> Result<ArchiveFormat> {
        match self.format {
            Some(format) => Ok(format),
            None => detect_format(self.output()?),
        }
    }

    /// Returns writer options derived from this configuration.
    #[must_use]
    pub fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            compression_level: self.compression_level.unwrap_or(DEFAULT_COMPRESSION_LEVEL),
        }
    }

    /// Validates the configuration without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `out` is missing
    /// - `srcs` is empty
    /// - the format cannot be written (only zip and tar can)
    /// - the compression level is outside 1-9
    pub fn validate(&self) -> Result<()> {
        self.output()?;

        if self.srcs.is_empty() {
            return Err(ArchiveError::config(format!(
                "archive '{}' has no sources",
                self.name
            )));
        }

        let format = self.resolved_format()?;
        if !format.is_writable() {
            return Err(ArchiveError::config(format!(
                "cannot create {format} archives; valid choices are 'zip' and 'tar'"
            )));
        }

        if let Some(level) = self.compression_level
            && !(1..=9).contains(&level)
        {
            return Err(ArchiveError::config(format!(
                "compression level {level} is outside 1-9"
            )));
        }

        Ok(())
    }
}

/// Configuration of one unarchive job.
///
/// # Examples
///
/// ```
/// use stowage_core::UnarchiveConfig;
///
/// let config = UnarchiveConfig::new("deps")
///     .with_src("vendor/deps.tar.gz")
///     .with_exported_files(vec!["lib/*.so".to_string()]);
/// config.validate()?;
///
/// let bad = UnarchiveConfig::new("deps")
///     .with_src("vendor/deps.tar.gz")
///     .with_out(":other_target");
/// assert!(bad.validate().is_err());
/// # Ok::<(), stowage_core::ArchiveError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnarchiveConfig {
    /// Job name, used in logs and to select jobs from a build file.
    pub name: String,

    /// Archive to read.
    pub src: Option<PathBuf>,

    /// Output directory. Defaults to the working root when only
    /// `exported_files` is given.
    pub out: Option<PathBuf>,

    /// Globs selecting which extracted paths to keep.
    pub exported_files: Vec<String>,
}

impl UnarchiveConfig {
    /// Creates an empty configuration named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the archive to read.
    #[must_use]
    pub fn with_src(mut self, src: impl Into<PathBuf>) -> Self {
        self.src = Some(src.into());
        self
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_out(mut self, out: impl Into<PathBuf>) -> Self {
        self.out = Some(out.into());
        self
    }

    /// Sets the export globs.
    #[must_use]
    pub fn with_exported_files(mut self, patterns: Vec<String>) -> Self {
        self.exported_files = patterns;
        self
    }

    /// Returns the archive path.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `src` is not set.
    pub fn source(&self) -> Result<&Path> {
        self.src
            .as_deref()
            .ok_or_else(|| ArchiveError::config(format!("unarchive '{}' has no source", self.name)))
    }

    /// Validates the configuration without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `src` is missing or its format cannot be detected
    /// - neither `out` nor `exported_files` is set
    /// - `out` is a target reference instead of a path
    pub fn validate(&self) -> Result<()> {
        let src = self.source()?;

        if self.out.is_none() && self.exported_files.is_empty() {
            return Err(ArchiveError::config(format!(
                "unarchive '{}' needs 'out' or 'exported_files'",
                self.name
            )));
        }

        if let Some(out) = &self.out
            && is_target_reference(&out.to_string_lossy())
        {
            return Err(ArchiveError::config(format!(
                "unarchive '{}' output {} must be a path, not a target reference",
                self.name,
                out.display()
            )));
        }

        detect_format(src)?;
        Ok(())
    }
}
