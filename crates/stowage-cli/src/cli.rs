//! CLI argument parsing using clap.

use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;
use stowage_core::ArchiveFormat;

#[derive(Parser)]
#[command(name = "stowage")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pack files and directories into a zip or tar archive
    Archive(ArchiveArgs),
    /// Extract an archive, optionally keeping only matching paths
    Unarchive(UnarchiveArgs),
    /// Run the jobs declared in a build file
    Run(RunArgs),
}

#[derive(clap::Args)]
pub struct ArchiveArgs {
    /// Output archive file path (relative to --root)
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Source files or directories to archive (relative to --root)
    #[arg(value_name = "SOURCE", required = true)]
    pub sources: Vec<PathBuf>,

    /// Archive format; inferred from the output name when omitted
    #[arg(short = 't', long = "type", value_name = "FORMAT", value_parser = parse_format)]
    pub format: Option<ArchiveFormat>,

    /// Working root that entry names are computed against (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Skip every path containing PATTERN (plain substring, can be repeated)
    #[arg(long = "exclude", short = 'x', value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Read more exclusion patterns from FILE, one per line
    #[arg(long, value_name = "FILE")]
    pub exclusion_file: Option<PathBuf>,

    /// Compression level (1-9, zip only)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub compression_level: Option<u8>,

    /// Overwrite output file if exists
    #[arg(short = 'f', long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct UnarchiveArgs {
    /// Path to the archive file (relative to --root)
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory (relative to --root)
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Keep only extracted paths matching GLOB (can be repeated)
    #[arg(long = "export", short = 'e', value_name = "GLOB")]
    pub export: Vec<String>,

    /// Working root (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Build file declaring [[archive]] and [[unarchive]] jobs
    #[arg(short = 'F', long, value_name = "FILE", default_value = "stowage.toml")]
    pub file: PathBuf,

    /// Only run the jobs with these names
    #[arg(value_name = "NAME")]
    pub jobs: Vec<String>,
}

fn parse_format(s: &str) -> Result<ArchiveFormat, String> {
    s.parse::<ArchiveFormat>().map_err(|e| e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(parse_format("zip").unwrap(), ArchiveFormat::Zip);
        assert_eq!(parse_format("tar").unwrap(), ArchiveFormat::Tar);
        assert!(parse_format("TAR").is_err());
        assert_eq!(parse_format("tgz").unwrap(), ArchiveFormat::TarGz);
        assert!(parse_format("rar").is_err());
    }

    #[test]
    fn test_verbose_counts() {
        let cli = Cli::try_parse_from(["stowage", "-vv", "run"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_archive_args() {
        let cli = Cli::try_parse_from([
            "stowage", "archive", "out.zip", "src", "docs", "-x", "target", "-x", ".git", "-l",
            "9",
        ])
        .unwrap();

        let Commands::Archive(args) = cli.command else {
            panic!("expected archive command");
        };
        assert_eq!(args.sources, vec![PathBuf::from("src"), PathBuf::from("docs")]);
        assert_eq!(args.exclude, vec!["target", ".git"]);
        assert_eq!(args.compression_level, Some(9));
        assert!(args.format.is_none());
    }

    #[test]
    fn test_archive_requires_source() {
        assert!(Cli::try_parse_from(["stowage", "archive", "out.zip"]).is_err());
    }
}
