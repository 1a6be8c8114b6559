//! Unarchive command implementation.

use anyhow::Result;
use stowage_core::UnarchiveConfig;
use stowage_core::unarchive;

use super::resolve;
use super::working_root;
use crate::cli::UnarchiveArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;

pub fn execute(args: &UnarchiveArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let root = working_root(args.root.as_deref());
    let archive = resolve(&root, &args.archive);

    let name = args
        .archive
        .file_name()
        .map_or_else(|| "unarchive".to_string(), |s| s.to_string_lossy().into_owned());

    let mut config = UnarchiveConfig::new(name)
        .with_src(&args.archive)
        .with_exported_files(args.export.clone());
    if let Some(out) = &args.out {
        config = config.with_out(out);
    }

    let report = add_archive_context(unarchive(&config, &root), &archive)?;

    if !args.export.is_empty() && report.exported.is_empty() {
        formatter.format_warning("no extracted paths matched the export patterns");
    }

    formatter.format_unarchive_result(&report)
}
