//! Archive command implementation.

use anyhow::Result;
use anyhow::bail;
use stowage_core::ArchiveConfig;
use stowage_core::create_archive;

use super::resolve;
use super::working_root;
use crate::cli::ArchiveArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;

pub fn execute(args: &ArchiveArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let root = working_root(args.root.as_deref());
    let output = resolve(&root, &args.output);

    if output.exists() && !args.force {
        bail!(
            "Output file '{}' already exists\n\
             HINT: Use --force to overwrite it.",
            output.display()
        );
    }

    let name = args
        .output
        .file_stem()
        .map_or_else(|| "archive".to_string(), |s| s.to_string_lossy().into_owned());

    let config = ArchiveConfig::new(name)
        .with_srcs(args.sources.clone())
        .with_format(args.format)
        .with_out(&args.output)
        .with_exclusions(args.exclude.clone())
        .with_exclusion_file(args.exclusion_file.clone())
        .with_compression_level(args.compression_level);

    let report = add_archive_context(create_archive(&config, &root), &output)?;
    formatter.format_creation_result(&output, &report)
}
