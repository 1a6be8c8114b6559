//! Diagnostic logging setup.
//!
//! Logs go to stderr so that stdout stays reserved for command results,
//! including JSON output. `RUST_LOG` overrides the level picked from the
//! `-v`/`-q` flags.

use anyhow::Result;
use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

/// Maps the verbosity flags to a default filter directive.
fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global tracing subscriber.
pub fn init(verbose: u8, quiet: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!(e))
}
