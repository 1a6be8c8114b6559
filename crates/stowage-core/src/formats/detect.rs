//! Archive format detection.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::ArchiveError;
use crate::Result;

/// Supported archive formats.
///
/// Zip and Tar can be both written and read; gzip-compressed tar is only ever
/// read. Use [`ArchiveFormat::is_writable`] before opening a writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ArchiveFormat {
    /// ZIP archive.
    Zip,
    /// Tar archive (uncompressed).
    Tar,
    /// Gzip-compressed tar archive.
    TarGz,
}

impl ArchiveFormat {
    /// Returns the canonical lowercase name of the format.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Tar => "tar",
            Self::TarGz => "tar.gz",
        }
    }

    /// Returns `true` if archives of this format can be created.
    ///
    /// # Examples
    ///
    /// ```
    /// use stowage_core::ArchiveFormat;
    ///
    /// assert!(ArchiveFormat::Zip.is_writable());
    /// assert!(ArchiveFormat::Tar.is_writable());
    /// assert!(!ArchiveFormat::TarGz.is_writable());
    /// ```
    #[must_use]
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::Zip | Self::Tar)
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ArchiveFormat {
    type Err = ArchiveError;

    /// Parses an explicit format value: `zip`, `tar`, `tar.gz` or `tgz`.
    /// Values are case-sensitive.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "zip" => Ok(Self::Zip),
            "tar" => Ok(Self::Tar),
            "tar.gz" | "tgz" => Ok(Self::TarGz),
            _ => Err(ArchiveError::UnsupportedFormat {
                name: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ArchiveFormat {
    type Error = ArchiveError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Detects the archive format from a file name suffix.
///
/// `.zip` is Zip, `.tar` is Tar, `.tar.gz` and `.tgz` are TarGz. Suffixes are
/// case-sensitive, so `X.ZIP` is not recognized. Any other suffix is an error.
///
/// # Errors
///
/// Returns [`ArchiveError::UnsupportedFormat`] if no suffix matches.
///
/// # Examples
///
/// ```
/// use stowage_core::ArchiveFormat;
/// use stowage_core::detect_format;
///
/// assert_eq!(detect_format("dist/app.tgz").unwrap(), ArchiveFormat::TarGz);
/// assert!(detect_format("app.rar").is_err());
/// ```
pub fn detect_format<P: AsRef<Path>>(path: P) -> Result<ArchiveFormat> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .ok_or_else(|| ArchiveError::UnsupportedFormat {
            name: path.display().to_string(),
        })?;

    if name.ends_with(".zip") {
        Ok(ArchiveFormat::Zip)
    } else if name.ends_with(".tar") {
        Ok(ArchiveFormat::Tar)
    } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        Ok(ArchiveFormat::TarGz)
    } else {
        Err(ArchiveError::UnsupportedFormat {
            name: path.display().to_string(),
        })
    }
}
