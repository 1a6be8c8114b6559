//! Subcommand implementations.

pub mod archive;
pub mod run;
pub mod unarchive;

use std::path::Path;
use std::path::PathBuf;

/// Returns the working root given on the command line, or the current
/// directory.
fn working_root(root: Option<&Path>) -> PathBuf {
    root.map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Resolves `path` against `root` unless it is already absolute.
fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
