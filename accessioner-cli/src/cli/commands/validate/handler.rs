//! Validate command handler
//!
//! Catches the mistakes that would otherwise surface mid-run: a filename
//! without an action marker, rows without an ArchivesSpace reference, event
//! dates in an unsupported shape, and byte counts that are not numbers.

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::*;

use super::ValidateCommands;
use crate::accession::Action;
use crate::accession::dates::normalize_date;
use crate::accession::list_spreadsheets;
use crate::accession::resolver::resolve_parent_id;
use crate::accession::row::{HEADER_ROW_COUNT, read_rows};
use crate::config::Config;

/// One problem found in a sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub row: Option<usize>,
    pub message: String,
}

impl Finding {
    fn file(message: impl Into<String>) -> Self {
        Self {
            row: None,
            message: message.into(),
        }
    }

    fn row(row: usize, message: impl Into<String>) -> Self {
        Self {
            row: Some(row),
            message: message.into(),
        }
    }
}

pub fn handle_validate_command(args: ValidateCommands) -> Result<()> {
    if args.no_color {
        colored::control::set_override(false);
    }

    let files: Vec<PathBuf> = if args.files.is_empty() {
        let drive = match args.drive {
            Some(drive) => drive,
            None => Config::load(args.config.as_deref())?.drive_path(None, None)?,
        };
        list_spreadsheets(&drive)?
    } else {
        args.files
    };

    let mut total = 0;
    for file in &files {
        let findings = validate_file(file);
        if findings.is_empty() {
            println!("{} {}", "OK".green().bold(), file.display());
            continue;
        }

        total += findings.len();
        println!("{} {}", "FAIL".red().bold(), file.display());
        for finding in findings {
            match finding.row {
                Some(row) => println!("  row {}: {}", row, finding.message),
                None => println!("  {}", finding.message),
            }
        }
    }

    if total > 0 {
        anyhow::bail!("{} problem(s) found in {} file(s)", total, files.len());
    }
    Ok(())
}

/// Every problem in one sheet; empty when the sheet is ready to run
pub fn validate_file(path: &Path) -> Vec<Finding> {
    let mut findings = Vec::new();

    if let Err(e) = Action::from_path(path) {
        findings.push(Finding::file(e.to_string()));
    }

    let rows = match read_rows(path) {
        Ok(rows) => rows,
        Err(e) => {
            findings.push(Finding::file(format!("unreadable: {}", e)));
            return findings;
        }
    };
    if rows.is_empty() {
        findings.push(Finding::file("no data rows"));
    }

    for (index, row) in rows.iter().enumerate() {
        let row_number = index + HEADER_ROW_COUNT + 1;

        if resolve_parent_id(&row.parent_record).is_empty() {
            findings.push(Finding::row(
                row_number,
                "missing ArchivesSpace URI (row will be skipped)",
            ));
        }

        let bytes = row.number_of_bytes.trim().replace(',', "");
        if !bytes.is_empty() && !bytes.chars().all(|c| c.is_ascii_digit()) {
            findings.push(Finding::row(
                row_number,
                format!("Number_of_bytes is not a number: {}", row.number_of_bytes),
            ));
        }

        for (slot_index, slot) in row.events.iter().enumerate() {
            if !slot.is_present() {
                continue;
            }
            if let Err(e) = normalize_date(&slot.begin) {
                findings.push(Finding::row(
                    row_number,
                    format!("Begin_{}: {}", slot_index + 1, e),
                ));
            }
        }
    }

    findings
}
