//! Console status output for a run
//!
//! The pipeline reports progress through a `Reporter` handed to it rather
//! than printing directly, so tests can run silently and the CLI decides on
//! colors.

use std::path::Path;

use colored::*;

use crate::accession::FileOutcome;

/// Receives user-facing progress events
pub trait Reporter {
    fn file_started(&self, path: &Path, row_count: usize);
    fn row_skipped(&self, row_number: usize, reason: &str);
    fn row_failed(&self, row_number: usize, error: &str);
    fn row_done(&self, row_number: usize, uri: &str);
    fn file_finished(&self, path: &Path, outcome: FileOutcome, rows_written: usize);
    fn message(&self, text: &str);
}

/// Colored terminal output
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn file_started(&self, path: &Path, row_count: usize) {
        println!(
            "{} {} ({} rows)",
            "Processing".bright_blue().bold(),
            path.display().to_string().cyan(),
            row_count
        );
    }

    fn row_skipped(&self, row_number: usize, reason: &str) {
        println!("  {} row {}: {}", "Skipping".yellow(), row_number, reason.dimmed());
    }

    fn row_failed(&self, row_number: usize, error: &str) {
        println!("  {} row {}: {}", "Error".red().bold(), row_number, error);
    }

    fn row_done(&self, row_number: usize, uri: &str) {
        println!("  {} row {} -> {}", "✓".green(), row_number, uri.dimmed());
    }

    fn file_finished(&self, path: &Path, outcome: FileOutcome, rows_written: usize) {
        let label = match outcome {
            FileOutcome::Complete => "complete".bright_green().bold(),
            FileOutcome::Errors => "errors".red().bold(),
        };
        println!(
            "{} {} [{}] {} rows written",
            "Finished".bright_blue().bold(),
            path.display(),
            label,
            rows_written
        );
    }

    fn message(&self, text: &str) {
        println!("{}", text);
    }
}

/// Discards everything
#[derive(Debug, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn file_started(&self, _path: &Path, _row_count: usize) {}
    fn row_skipped(&self, _row_number: usize, _reason: &str) {}
    fn row_failed(&self, _row_number: usize, _error: &str) {}
    fn row_done(&self, _row_number: usize, _uri: &str) {}
    fn file_finished(&self, _path: &Path, _outcome: FileOutcome, _rows_written: usize) {}
    fn message(&self, _text: &str) {}
}
