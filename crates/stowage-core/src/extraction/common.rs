//! Filesystem writes shared by the tar and zip extractors.

use std::fs;
use std::fs::OpenOptions;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;

use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;

/// Mode applied to directories whose record carries no permission bits.
pub(crate) const DEFAULT_DIR_MODE: u32 = 0o755;

/// Mode applied to files whose record carries no permission bits.
pub(crate) const DEFAULT_FILE_MODE: u32 = 0o644;

/// Creates `path` and any missing ancestors, then applies `mode`.
///
/// Owner `rwx` is always kept so later entries can be written below the
/// directory. An existing directory is not an error.
pub(crate) fn create_directory(path: &Path, mode: Option<u32>) -> Result<()> {
    fs::create_dir_all(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = (mode.unwrap_or(DEFAULT_DIR_MODE) & 0o7777) | 0o700;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}

/// Writes one regular file at `path` from `reader`, creating missing parent
/// directories. Returns the number of bytes written.
///
/// An existing file or symlink at `path` is replaced rather than written
/// through, so a read-only leftover from an earlier extraction does not
/// block a second pass.
pub(crate) fn extract_file<R: Read + ?Sized>(
    reader: &mut R,
    path: &Path,
    mode: Option<u32>,
    buffer: &mut CopyBuffer,
) -> Result<u64> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    if let Ok(existing) = fs::symlink_metadata(path)
        && !existing.is_dir()
    {
        fs::remove_file(path)?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode.unwrap_or(DEFAULT_FILE_MODE) & 0o7777);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let file = options.open(path)?;
    let mut writer = BufWriter::with_capacity(buffer.size(), file);
    let written = copy_with_buffer(reader, &mut writer, buffer)?;
    writer.flush()?;

    Ok(written)
}
