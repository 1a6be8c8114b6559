//! Archive writer capability.
//!
//! A writer session owns its destination stream from [`open_writer`] until
//! [`ArchiveWriter::finish`]. Exactly two implementations exist: zip and tar.

use std::fs::Metadata;
use std::path::Path;

use crate::ArchiveError;
use crate::Result;
use crate::creation::tar::TarArchiveWriter;
use crate::creation::zip::ZipArchiveWriter;
use crate::formats::ArchiveFormat;

/// Default deflate level for zip entries.
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 6;

/// Appends filesystem entries to an archive stream.
pub trait ArchiveWriter {
    /// Appends one entry read from `source` under the archive name `name`.
    ///
    /// Regular files get a header built from `metadata` followed by their
    /// content, streamed in bounded memory. Directories produce a zero-length
    /// record where the format supports one and nothing otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read, the archive cannot be
    /// written, or the session is already finished.
    fn compress_file(&mut self, source: &Path, name: &str, metadata: &Metadata) -> Result<()>;

    /// Writes trailing metadata, flushes and releases the destination.
    ///
    /// Calling `finish` again after a successful call does nothing.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the trailer cannot be written or flushed.
    fn finish(&mut self) -> Result<()>;

    /// Returns the format this writer produces.
    fn format(&self) -> ArchiveFormat;
}

/// Options shared by writer implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    /// Deflate level 1-9 for zip entries; ignored by tar.
    pub compression_level: u8,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

/// Creates `output` and opens a writer session for `format`.
///
/// # Errors
///
/// Returns [`ArchiveError::Configuration`] if `format` cannot be written
/// (gzip-compressed tar is extraction-only), or an I/O error if the output
/// file cannot be created.
///
/// # Examples
///
/// ```no_run
/// use stowage_core::ArchiveFormat;
/// use stowage_core::creation::writer::WriterOptions;
/// use stowage_core::creation::writer::open_writer;
/// use std::path::Path;
///
/// let mut writer = open_writer(ArchiveFormat::Tar, Path::new("out.tar"), WriterOptions::default())?;
/// let metadata = std::fs::metadata("Cargo.toml")?;
/// writer.compress_file(Path::new("Cargo.toml"), "Cargo.toml", &metadata)?;
/// writer.finish()?;
/// # Ok::<(), stowage_core::ArchiveError>(())
/// ```
pub fn open_writer(
    format: ArchiveFormat,
    output: &Path,
    options: WriterOptions,
) -> Result<Box<dyn ArchiveWriter>> {
    match format {
        ArchiveFormat::Zip => Ok(Box::new(ZipArchiveWriter::create(output, options)?)),
        ArchiveFormat::Tar => Ok(Box::new(TarArchiveWriter::create(output)?)),
        ArchiveFormat::TarGz => Err(not_writable(format)),
    }
}

/// Returns a configuration error unless archives of `format` can be created.
pub(crate) fn ensure_writable(format: ArchiveFormat) -> Result<()> {
    if format.is_writable() {
        Ok(())
    } else {
        Err(not_writable(format))
    }
}

fn not_writable(format: ArchiveFormat) -> ArchiveError {
    ArchiveError::config(format!(
        "cannot create {format} archives; valid choices are 'zip' and 'tar'"
    ))
}

/// Returns the Unix permission bits of `metadata`, or a default on other
/// platforms.
pub(crate) fn permission_bits(metadata: &Metadata) -> u32 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o7777
    }
    #[cfg(not(unix))]
    {
        if metadata.is_dir() {
            0o755
        } else if metadata.permissions().readonly() {
            0o444
        } else {
            0o644
        }
    }
}
