//! High-level operations driven by job configuration.

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use tracing::info;

use crate::ArchiveConfig;
use crate::ArchiveError;
use crate::Result;
use crate::UnarchiveConfig;
use crate::UnarchiveReport;
use crate::creation::CreationReport;
use crate::creation::ExclusionSet;
use crate::creation::pack;
use crate::export::export_selected;
use crate::extraction::extract_archive;

/// Resolves `path` against `root` unless it is already absolute.
fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn require_directory(root: &Path) -> Result<()> {
    if fs::metadata(root).is_ok_and(|m| m.is_dir()) {
        Ok(())
    } else {
        Err(ArchiveError::config(format!(
            "working root {} is not a directory",
            root.display()
        )))
    }
}

/// Creates the archive described by `config`.
///
/// Sources, the output and the exclusion file resolve against
/// `working_root`, and archive entry names are computed relative to it.
/// Missing parent directories of the output are created.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the exclusion file
/// cannot be read, or packing fails. See [`pack`].
///
/// # Examples
///
/// ```no_run
/// use stowage_core::ArchiveConfig;
/// use stowage_core::create_archive;
/// use std::path::Path;
///
/// let config = ArchiveConfig::new("bundle")
///     .with_source("src")
///     .with_out("dist/bundle.tar");
/// let report = create_archive(&config, Path::new("/work/app"))?;
/// println!("Added {} files", report.files_added);
/// # Ok::<(), stowage_core::ArchiveError>(())
/// ```
pub fn create_archive(config: &ArchiveConfig, working_root: &Path) -> Result<CreationReport> {
    config.validate()?;
    require_directory(working_root)?;

    let format = config.resolved_format()?;
    let output = resolve(working_root, config.output()?);
    let exclusion_file = config
        .exclusion_file
        .as_deref()
        .map(|path| resolve(working_root, path));
    let exclusions = ExclusionSet::from_sources(&config.exclusions, exclusion_file.as_deref())?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }

    pack(
        &config.srcs,
        working_root,
        &output,
        format,
        &exclusions,
        config.writer_options(),
    )
}

/// Runs the unarchive job described by `config`.
///
/// Without `exported_files` the archive is extracted straight into
/// `working_root/out`. Otherwise it is extracted into a private staging
/// directory and only the matching paths are copied into `working_root/out`,
/// or into `working_root` itself when `out` is absent. The staging directory
/// is removed afterwards, also on failure.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, extraction fails or a
/// selected path cannot be copied.
///
/// # Examples
///
/// ```no_run
/// use stowage_core::UnarchiveConfig;
/// use stowage_core::unarchive;
/// use std::path::Path;
///
/// let config = UnarchiveConfig::new("deps")
///     .with_src("vendor/deps.zip")
///     .with_out("third_party")
///     .with_exported_files(vec!["include/**".to_string()]);
/// let report = unarchive(&config, Path::new("/work/app"))?;
/// println!("exported {} paths", report.exported.len());
/// # Ok::<(), stowage_core::ArchiveError>(())
/// ```
pub fn unarchive(config: &UnarchiveConfig, working_root: &Path) -> Result<UnarchiveReport> {
    config.validate()?;
    require_directory(working_root)?;

    let start = Instant::now();
    let src = resolve(working_root, config.source()?);
    let output = config
        .out
        .as_deref()
        .map_or_else(|| working_root.to_path_buf(), |out| resolve(working_root, out));

    if config.exported_files.is_empty() {
        let extraction = extract_archive(&src, &output)?;
        return Ok(UnarchiveReport {
            extraction,
            exported: Vec::new(),
            output,
        });
    }

    let staging = tempfile::Builder::new().prefix("stowage-").tempdir()?;
    let extraction = extract_archive(&src, staging.path())?;
    fs::create_dir_all(&output)?;
    let exported = export_selected(staging.path(), &config.exported_files, &output)?;
    staging.close()?;

    info!(
        name = %config.name,
        archive = %src.display(),
        output = %output.display(),
        exported = exported.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "selective export finished"
    );

    Ok(UnarchiveReport {
        extraction,
        exported,
        output,
    })
}
