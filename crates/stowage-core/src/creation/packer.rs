//! Tree packer: walk, filter, write, finalize.

use std::fs;
use std::path::Path;
use std::time::Instant;

use tempfile::NamedTempFile;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::Result;
use crate::creation::exclusion::ExclusionSet;
use crate::creation::report::CreationReport;
use crate::creation::walker::EntryKind;
use crate::creation::walker::SourceEntry;
use crate::creation::walker::SourceWalk;
use crate::creation::walker::check_sources;
use crate::creation::writer::ArchiveWriter;
use crate::creation::writer::WriterOptions;
use crate::creation::writer::ensure_writable;
use crate::creation::writer::open_writer;
use crate::formats::ArchiveFormat;

/// Builds the archive `output` from `sources`.
///
/// Every entry reachable from the sources is visited depth-first, dropped if
/// its path contains an exclusion pattern, and otherwise handed to the writer
/// under its name relative to `working_root`. The archive is written to a
/// temporary file next to `output` and moved into place only once it is
/// complete, so a failed run leaves any previous archive at `output` intact.
/// Neither that file nor a previous archive at `output` is ever added, even
/// when they lie inside a source directory.
///
/// # Errors
///
/// Returns an error if `format` cannot be written, a source is missing or
/// lies outside `working_root`, or any read or write fails.
///
/// # Examples
///
/// ```no_run
/// use stowage_core::ArchiveFormat;
/// use stowage_core::creation::ExclusionSet;
/// use stowage_core::creation::WriterOptions;
/// use stowage_core::creation::pack;
/// use std::path::Path;
///
/// let exclusions = ExclusionSet::from_sources(&["target"], None)?;
/// let report = pack(
///     &["src", "Cargo.toml"],
///     Path::new("/work/app"),
///     Path::new("/work/app/dist/app.zip"),
///     ArchiveFormat::Zip,
///     &exclusions,
///     WriterOptions::default(),
/// )?;
/// println!("{} files, {} bytes", report.files_added, report.archive_size);
/// # Ok::<(), stowage_core::ArchiveError>(())
/// ```
pub fn pack<P: AsRef<Path>>(
    sources: &[P],
    working_root: &Path,
    output: &Path,
    format: ArchiveFormat,
    exclusions: &ExclusionSet,
    options: WriterOptions,
) -> Result<CreationReport> {
    let start = Instant::now();
    ensure_writable(format)?;
    check_sources(sources, working_root)?;

    let staging = staging_file(output)?;
    let own_files = OwnFiles::new(&[staging.path(), output]);
    let mut writer = open_writer(format, staging.path(), options)?;
    let mut report = CreationReport::default();

    let outcome = write_entries(
        writer.as_mut(),
        sources,
        working_root,
        &own_files,
        exclusions,
        &mut report,
    )
    .and_then(|()| writer.finish());
    drop(writer);

    if let Err(e) = outcome {
        if let Err(remove_err) = staging.close() {
            warn!(
                output = %output.display(),
                error = %remove_err,
                "could not remove partial archive"
            );
        }
        return Err(e);
    }

    staging.persist(output).map_err(|e| e.error)?;
    report.archive_size = fs::metadata(output)?.len();
    report.duration = start.elapsed();

    info!(
        output = %output.display(),
        format = %format,
        files = report.files_added,
        excluded = report.entries_excluded,
        size = report.archive_size,
        "archive created"
    );

    Ok(report)
}

/// Creates the temporary file an archive is written to before it replaces
/// `output`. It lives in the same directory so the final rename stays on
/// one filesystem.
fn staging_file(output: &Path) -> Result<NamedTempFile> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".stowage-").suffix(".partial");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // umask still applies, as for a plain File::create
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    Ok(builder.tempfile_in(dir)?)
}

/// Files the packer writes or replaces, identified by what they are on disk
/// rather than by how their path is spelled.
struct OwnFiles {
    #[cfg(unix)]
    ids: Vec<(u64, u64)>,
    #[cfg(not(unix))]
    paths: Vec<std::path::PathBuf>,
}

impl OwnFiles {
    #[cfg(unix)]
    fn new(paths: &[&Path]) -> Self {
        let ids = paths
            .iter()
            .filter_map(|path| fs::metadata(path).ok())
            .map(|metadata| file_id(&metadata))
            .collect();
        Self { ids }
    }

    #[cfg(not(unix))]
    fn new(paths: &[&Path]) -> Self {
        let paths = paths
            .iter()
            .filter_map(|path| fs::canonicalize(path).ok())
            .collect();
        Self { paths }
    }

    #[cfg(unix)]
    fn contains(&self, entry: &SourceEntry) -> bool {
        self.ids.contains(&file_id(&entry.metadata))
    }

    #[cfg(not(unix))]
    fn contains(&self, entry: &SourceEntry) -> bool {
        fs::canonicalize(&entry.path).is_ok_and(|path| self.paths.contains(&path))
    }
}

#[cfg(unix)]
fn file_id(metadata: &std::fs::Metadata) -> (u64, u64) {
    use std::os::unix::fs::MetadataExt;
    (metadata.dev(), metadata.ino())
}

fn write_entries<P: AsRef<Path>>(
    writer: &mut dyn ArchiveWriter,
    sources: &[P],
    working_root: &Path,
    own_files: &OwnFiles,
    exclusions: &ExclusionSet,
    report: &mut CreationReport,
) -> Result<()> {
    let mut walk = SourceWalk::new(sources, working_root, exclusions);

    for entry in walk.by_ref() {
        let entry = entry?;

        if entry.kind == EntryKind::File && own_files.contains(&entry) {
            debug!(name = %entry.name, "skipping the archive being written");
            continue;
        }

        writer.compress_file(&entry.path, &entry.name, &entry.metadata)?;

        match entry.kind {
            EntryKind::File => {
                report.files_added += 1;
                report.bytes_written += entry.metadata.len();
            }
            EntryKind::Directory => report.directories_seen += 1,
        }
        report.entries.push(entry.name);
    }

    report.entries_excluded = walk.excluded();
    report.entries_skipped = walk.skipped();
    Ok(())
}
