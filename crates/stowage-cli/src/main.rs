//! Stowage CLI - pack sources into zip or tar archives and unpack archives
//! with optional selective export.

mod build_file;
mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    if let Err(err) = logging::init(cli.verbose, cli.quiet) {
        eprintln!("warning: logging disabled: {err}");
    }

    let formatter = output::create_formatter(cli.json, cli.verbose > 0, cli.quiet);

    let result = match &cli.command {
        cli::Commands::Archive(args) => commands::archive::execute(args, &*formatter),
        cli::Commands::Unarchive(args) => commands::unarchive::execute(args, &*formatter),
        cli::Commands::Run(args) => commands::run::execute(args, &*formatter),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.format_error(&err);
            ExitCode::FAILURE
        }
    }
}
