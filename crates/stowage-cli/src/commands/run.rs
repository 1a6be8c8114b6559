//! Run command implementation: executes the jobs of a build file in order.

use anyhow::Result;
use stowage_core::create_archive;
use stowage_core::unarchive;
use tracing::info;

use super::resolve;
use crate::build_file::BuildFile;
use crate::build_file::Job;
use crate::build_file::working_root;
use crate::cli::RunArgs;
use crate::error::add_archive_context;
use crate::output::JobOutcome;
use crate::output::OutputFormatter;

pub fn execute(args: &RunArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let build_file = BuildFile::load(&args.file)?;
    let root = working_root(&args.file);
    let jobs = build_file.select(&args.jobs)?;

    if jobs.is_empty() {
        formatter.format_warning(&format!(
            "build file '{}' declares no jobs",
            args.file.display()
        ));
        return Ok(());
    }

    let mut outcomes = Vec::with_capacity(jobs.len());
    for job in jobs {
        info!(job = job.name(), "running job");
        let outcome = match job {
            Job::Archive(config) => {
                let output = config
                    .out
                    .as_deref()
                    .map_or_else(|| root.clone(), |out| resolve(&root, out));
                let report = add_archive_context(create_archive(config, &root), &output)
                    .map_err(|e| e.context(format!("job '{}' failed", config.name)))?;
                JobOutcome::Archive {
                    name: config.name.clone(),
                    output,
                    report,
                }
            }
            Job::Unarchive(config) => {
                let src = config
                    .src
                    .as_deref()
                    .map_or_else(|| root.clone(), |src| resolve(&root, src));
                let report = add_archive_context(unarchive(config, &root), &src)
                    .map_err(|e| e.context(format!("job '{}' failed", config.name)))?;
                JobOutcome::Unarchive {
                    name: config.name.clone(),
                    report,
                }
            }
        };
        outcomes.push(outcome);
    }

    formatter.format_run_result(&outcomes)
}
