//! Human-readable output formatter with colors and styling.

use std::path::Path;

use anyhow::Result;
use console::Term;
use console::style;
use stowage_core::CreationReport;
use stowage_core::UnarchiveReport;

use super::formatter::JobOutcome;
use super::formatter::OutputFormatter;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
    err_term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
            err_term: Term::stderr(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn heading(&self, text: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {text}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(text);
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    fn write_creation(&self, output: &Path, report: &CreationReport) {
        self.heading(&format!("Archive created: {}", output.display()));
        self.line(&format!(
            "  Files added:      {}",
            Self::format_number(report.files_added)
        ));
        self.line(&format!(
            "  Directories:      {}",
            Self::format_number(report.directories_seen)
        ));
        self.line(&format!(
            "  Total size:       {}",
            Self::format_size(report.bytes_written)
        ));
        self.line(&format!(
            "  Archive size:     {}",
            Self::format_size(report.archive_size)
        ));

        if report.entries_excluded > 0 {
            self.line(&format!(
                "  Excluded:         {}",
                Self::format_number(report.entries_excluded)
            ));
        }
        if report.entries_skipped > 0 {
            self.line(&format!(
                "  Skipped:          {}",
                Self::format_number(report.entries_skipped)
            ));
        }

        if self.verbose {
            self.line(&format!("  Duration:         {:?}", report.duration));
            for entry in &report.entries {
                self.line(&format!("    {entry}"));
            }
        }
    }

    fn write_unarchive(&self, report: &UnarchiveReport) {
        let extraction = &report.extraction;
        self.heading(&format!("Extraction complete: {}", report.output.display()));
        self.line(&format!(
            "  Files extracted:  {}",
            Self::format_number(extraction.files_extracted)
        ));
        self.line(&format!(
            "  Directories:      {}",
            Self::format_number(extraction.directories_created)
        ));
        self.line(&format!(
            "  Total size:       {}",
            Self::format_size(extraction.bytes_written)
        ));

        if !report.exported.is_empty() {
            self.line(&format!(
                "  Exported:         {}",
                Self::format_number(report.exported.len())
            ));
            if self.verbose {
                for path in &report.exported {
                    self.line(&format!("    {}", path.display()));
                }
            }
        }

        if self.verbose {
            self.line(&format!("  Duration:         {:?}", extraction.duration));
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_creation_result(&self, output: &Path, report: &CreationReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write_creation(output, report);
        Ok(())
    }

    fn format_unarchive_result(&self, report: &UnarchiveReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write_unarchive(report);
        Ok(())
    }

    fn format_run_result(&self, outcomes: &[JobOutcome]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for outcome in outcomes {
            match outcome {
                JobOutcome::Archive {
                    name,
                    output,
                    report,
                } => {
                    self.line(&format!("[{name}]"));
                    self.write_creation(output, report);
                }
                JobOutcome::Unarchive { name, report } => {
                    self.line(&format!("[{name}]"));
                    self.write_unarchive(report);
                }
            }
        }

        let summary = format!("{} job(s) finished", outcomes.len());
        self.line("");
        self.heading(&summary);
        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("WARNING: {message}"));
        }
    }
}
