//! Source tree traversal with exclusion filtering.
//!
//! [`SourceWalk`] turns a list of source roots into a flat, depth-first
//! sequence of [`SourceEntry`] values ready to be written into an archive.
//! Directories come before their children; siblings appear in the order the
//! filesystem returns them, without sorting.

use std::collections::VecDeque;
use std::fs;
use std::fs::Metadata;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::warn;
use walkdir::WalkDir;

use crate::ArchiveError;
use crate::Result;
use crate::creation::exclusion::ExclusionSet;

/// Kind of filesystem entry produced by the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file, or a symlink resolving to one.
    File,
    /// Directory, or a symlink resolving to one (never descended into).
    Directory,
}

/// A source entry that survived exclusion, with its archive-relative name.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    /// Filesystem path of the entry as walked.
    pub path: PathBuf,
    /// Archive-relative name: forward-slash separated, no leading root.
    pub name: String,
    /// File or directory.
    pub kind: EntryKind,
    /// Metadata of the entry, resolved through symlinks.
    pub metadata: Metadata,
}

/// Computes the archive-relative name of `path` under `root`.
///
/// Returns an empty string for the root itself.
///
/// # Errors
///
/// Returns [`ArchiveError::SourceOutsideRoot`] if `path` does not lie under
/// `root` once `.` and `..` are taken into account, or an
/// [`InvalidData`](std::io::ErrorKind::InvalidData) I/O error if a component
/// below `root` is not valid UTF-8.
///
/// # Examples
///
/// ```
/// use stowage_core::creation::walker::archive_name;
/// use std::path::Path;
///
/// let name = archive_name(Path::new("/work/app/src/main.rs"), Path::new("/work/app"))?;
/// assert_eq!(name, "src/main.rs");
/// # Ok::<(), stowage_core::ArchiveError>(())
/// ```
pub fn archive_name(path: &Path, root: &Path) -> Result<String> {
    let outside = || ArchiveError::SourceOutsideRoot {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    };

    let relative = path.strip_prefix(root).map_err(|_| outside())?;

    let mut parts: Vec<String> = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| {
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("file name is not valid UTF-8: {}", path.display()),
                    )
                })?;
                parts.push(part.to_string());
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(outside());
            }
        }
    }

    Ok(parts.join("/"))
}

/// Checks that every source exists and lies under `working_root`.
///
/// Runs before an archive is opened so that a bad source list never touches
/// the output.
///
/// # Errors
///
/// Returns [`ArchiveError::SourceNotFound`] or
/// [`ArchiveError::SourceOutsideRoot`] for the first offending source.
pub fn check_sources<P: AsRef<Path>>(sources: &[P], working_root: &Path) -> Result<()> {
    for source in sources {
        let path = resolve_source(source.as_ref(), working_root);
        if fs::symlink_metadata(&path).is_err() {
            return Err(ArchiveError::SourceNotFound { path });
        }
        archive_name(&path, working_root)?;
    }
    Ok(())
}

/// Lazy depth-first walk over several source roots.
///
/// Relative sources are resolved against the working root. Entries whose path
/// contains an exclusion pattern are skipped; an excluded directory is pruned
/// together with its subtree. The working root itself is never yielded.
///
/// # Examples
///
/// ```no_run
/// use stowage_core::creation::ExclusionSet;
/// use stowage_core::creation::walker::SourceWalk;
/// use std::path::Path;
/// use std::path::PathBuf;
///
/// let exclusions = ExclusionSet::from_sources(&["target"], None)?;
/// let sources = vec![PathBuf::from("src")];
/// let mut walk = SourceWalk::new(&sources, Path::new("/work/app"), &exclusions);
///
/// for entry in walk.by_ref() {
///     println!("{}", entry?.name);
/// }
/// println!("excluded {}", walk.excluded());
/// # Ok::<(), stowage_core::ArchiveError>(())
/// ```
pub struct SourceWalk<'a> {
    pending: VecDeque<PathBuf>,
    current: Option<walkdir::IntoIter>,
    working_root: &'a Path,
    exclusions: &'a ExclusionSet,
    excluded: usize,
    skipped: usize,
}

impl<'a> SourceWalk<'a> {
    /// Creates a walk over `sources`, naming entries relative to
    /// `working_root`.
    #[must_use]
    pub fn new<P: AsRef<Path>>(
        sources: &[P],
        working_root: &'a Path,
        exclusions: &'a ExclusionSet,
    ) -> Self {
        let pending = sources
            .iter()
            .map(|source| resolve_source(source.as_ref(), working_root))
            .collect();

        Self {
            pending,
            current: None,
            working_root,
            exclusions,
            excluded: 0,
            skipped: 0,
        }
    }

    /// Number of entries dropped by exclusion patterns so far.
    #[must_use]
    pub fn excluded(&self) -> usize {
        self.excluded
    }

    /// Number of entries skipped because they are neither files nor
    /// directories (sockets, FIFOs, devices).
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn start_next_root(&mut self) -> Option<Result<()>> {
        let root = self.pending.pop_front()?;

        if fs::symlink_metadata(&root).is_err() {
            return Some(Err(ArchiveError::SourceNotFound { path: root }));
        }

        debug!(source = %root.display(), "walking source");
        self.current = Some(WalkDir::new(root)
                .follow_links(false)
                .follow_root_links(false)
                .into_iter());
        Some(Ok(()))
    }

    fn build_entry(&mut self, entry: &walkdir::DirEntry) -> Result<Option<SourceEntry>> {
        let path = entry.path();
        let file_type = entry.file_type();

        let metadata = if file_type.is_symlink() {
            fs::metadata(path).map_err(|e| {
                std::io::Error::new(
                    e.kind(),
                    format!("cannot resolve symlink {}: {e}", path.display()),
                )
            })?
        } else {
            entry.metadata()?
        };

        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else if metadata.is_file() {
            EntryKind::File
        } else {
            warn!(path = %path.display(), "skipping special file");
            self.skipped += 1;
            return Ok(None);
        };

        let name = archive_name(path, self.working_root)?;
        if name.is_empty() {
            return Ok(None);
        }

        Ok(Some(SourceEntry {
            path: path.to_path_buf(),
            name,
            kind,
            metadata,
        }))
    }
}

impl Iterator for SourceWalk<'_> {
    type Item = Result<SourceEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(current) = self.current.as_mut() else {
                match self.start_next_root()? {
                    Ok(()) => continue,
                    Err(e) => return Some(Err(e)),
                }
            };

            let entry = match current.next() {
                None => {
                    self.current = None;
                    continue;
                }
                Some(Err(e)) => return Some(Err(e.into())),
                Some(Ok(entry)) => entry,
            };

            if self.exclusions.matches(entry.path()) {
                debug!(path = %entry.path().display(), "excluded");
                self.excluded += 1;
                if entry.file_type().is_dir() {
                    current.skip_current_dir();
                }
                continue;
            }

            match self.build_entry(&entry) {
                Ok(Some(source)) => return Some(Ok(source)),
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

fn resolve_source(source: &Path, working_root: &Path) -> PathBuf {
    if source.is_absolute() {
        source.to_path_buf()
    } else {
        working_root.join(source)
    }
}
