//! Selective export of an extracted tree.
//!
//! After an archive has been fully extracted into a staging root, only the
//! paths matching a set of globs are copied into the final location, keeping
//! their position relative to the staging root.

pub mod glob;

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::warn;
use walkdir::WalkDir;

use crate::Result;
use crate::copy::CopyBuffer;
use crate::creation::walker::archive_name;
use crate::creation::writer::permission_bits;
use crate::extraction::common::create_directory;
use crate::extraction::common::extract_file;

pub use glob::Glob;

/// Copies every path under `extract_root` that matches one of `patterns`
/// into `output_root`.
///
/// Patterns are applied one after another; each walks the tree in file-name
/// order. A matched directory is copied with its whole subtree and not
/// descended into further for the same pattern. A matched file is copied on
/// its own. Missing parent directories are created and existing files are
/// overwritten. A pattern that matches nothing is not an error.
///
/// Returns the destination path of every matched item, in match order,
/// without duplicates.
///
/// # Errors
///
/// Returns [`ArchiveError::InvalidPattern`](crate::ArchiveError::InvalidPattern)
/// before copying anything if a pattern does not compile, and an I/O error
/// if reading or copying fails.
///
/// # Examples
///
/// ```no_run
/// use stowage_core::export::export_selected;
/// use std::path::Path;
///
/// let written = export_selected(Path::new("/tmp/staging"), &["lib/*.so"], Path::new("out"))?;
/// println!("exported {} paths", written.len());
/// # Ok::<(), stowage_core::ArchiveError>(())
/// ```
pub fn export_selected<S: AsRef<str>>(
    extract_root: &Path,
    patterns: &[S],
    output_root: &Path,
) -> Result<Vec<PathBuf>> {
    let globs = patterns
        .iter()
        .map(|pattern| Glob::new(pattern.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let mut buffer = CopyBuffer::new();
    let mut exported = Vec::new();
    let mut seen = HashSet::new();

    for glob in &globs {
        let mut matched = 0usize;
        let mut walk = WalkDir::new(extract_root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walk.next() {
            let entry = entry?;
            let relative = archive_name(entry.path(), extract_root)?;
            if !glob.matches(&relative) {
                continue;
            }

            matched += 1;
            let destination = output_root.join(&relative);
            if entry.file_type().is_dir() {
                copy_tree(entry.path(), &destination, &mut buffer)?;
                walk.skip_current_dir();
            } else if entry.file_type().is_file() {
                copy_file(entry.path(), &destination, &mut buffer)?;
            } else {
                warn!(path = %entry.path().display(), "not exporting non-regular file");
                continue;
            }

            debug!(pattern = %glob, path = %relative, "exported");
            if seen.insert(destination.clone()) {
                exported.push(destination);
            }
        }

        if matched == 0 {
            warn!(pattern = %glob, root = %extract_root.display(), "export pattern matched nothing");
        }
    }

    Ok(exported)
}

/// Recursively copies the directory `src` to `dst`.
fn copy_tree(src: &Path, dst: &Path, buffer: &mut CopyBuffer) -> Result<()> {
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let relative = archive_name(entry.path(), src)?;
        let target = if relative.is_empty() {
            dst.to_path_buf()
        } else {
            dst.join(relative)
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            create_directory(&target, Some(permission_bits(&entry.metadata()?)))?;
        } else if file_type.is_file() {
            copy_file(entry.path(), &target, buffer)?;
        } else {
            warn!(path = %entry.path().display(), "not exporting non-regular file");
        }
    }
    Ok(())
}

fn copy_file(src: &Path, dst: &Path, buffer: &mut CopyBuffer) -> Result<()> {
    let mut file = File::open(src)?;
    let mode = permission_bits(&file.metadata()?);
    extract_file(&mut file, dst, Some(mode), buffer)?;
    Ok(())
}
