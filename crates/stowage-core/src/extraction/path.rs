//! Mapping untrusted entry names onto the destination root.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::ArchiveError;
use crate::Result;

/// Resolves an archive entry name to a path under `dest`.
///
/// The name is treated as untrusted input. `.` components are ignored;
/// `..`, absolute roots and drive prefixes are rejected outright instead of
/// being clamped, so a crafted archive fails loudly. A name with no normal
/// components resolves to `dest` itself.
///
/// # Errors
///
/// Returns [`ArchiveError::PathEscape`] if the name could leave `dest`.
///
/// # Examples
///
/// ```
/// use stowage_core::extraction::path::entry_destination;
/// use std::path::Path;
///
/// let path = entry_destination(Path::new("/out"), "docs/./readme.txt")?;
/// assert_eq!(path, Path::new("/out/docs/readme.txt"));
///
/// assert!(entry_destination(Path::new("/out"), "../evil").is_err());
/// # Ok::<(), stowage_core::ArchiveError>(())
/// ```
pub fn entry_destination(dest: &Path, name: &str) -> Result<PathBuf> {
    let mut resolved = dest.to_path_buf();

    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ArchiveError::PathEscape {
                    name: name.to_string(),
                });
            }
        }
    }

    Ok(resolved)
}

/// Resolves a regular-file entry, which must name something below `dest`.
pub(crate) fn file_destination(dest: &Path, name: &str) -> Result<PathBuf> {
    let resolved = entry_destination(dest, name)?;
    if resolved == dest {
        return Err(ArchiveError::InvalidArchive(format!(
            "file entry {name:?} has no usable name"
        )));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_name() {
        let path = entry_destination(Path::new("/dest"), "a/b/c.txt").unwrap_or_default();
        assert_eq!(path, Path::new("/dest/a/b/c.txt"));
    }

    #[test]
    fn test_trailing_slash_directory() {
        let path = entry_destination(Path::new("/dest"), "a/b/").unwrap_or_default();
        assert_eq!(path, Path::new("/dest/a/b"));
    }

    #[test]
    fn test_parent_dir_rejected() {
        for name in ["../evil", "a/../../evil", "a/b/../c"] {
            let result = entry_destination(Path::new("/dest"), name);
            assert!(
                matches!(result, Err(ArchiveError::PathEscape { .. })),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_absolute_rejected() {
        let result = entry_destination(Path::new("/dest"), "/etc/passwd");
        assert!(matches!(result, Err(ArchiveError::PathEscape { .. })));
    }

    #[test]
    fn test_current_dir_is_root() {
        let path = entry_destination(Path::new("/dest"), "./").unwrap_or_default();
        assert_eq!(path, Path::new("/dest"));
    }

    #[test]
    fn test_file_needs_a_name() {
        assert!(matches!(
            file_destination(Path::new("/dest"), "./"),
            Err(ArchiveError::InvalidArchive(_))
        ));
        assert!(matches!(
            file_destination(Path::new("/dest"), ""),
            Err(ArchiveError::InvalidArchive(_))
        ));
    }
}
