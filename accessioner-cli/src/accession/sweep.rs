//! File sweep over the network drive
//!
//! Every `*.csv` directly under the drive path is processed in name order.
//! Once the sweep stops, normally or on a run-fatal error, each processed
//! file is moved into `complete/` or `errors/` according to its outcome.

use std::fs;
use std::path::{Path, PathBuf};

use super::pipeline::{FileOutcome, RunContext, process_file};
use crate::error::Result;

/// Directory layout under the drive path
#[derive(Debug, Clone)]
pub struct DriveLayout {
    pub root: PathBuf,
}

impl DriveLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn outputs(&self) -> PathBuf {
        self.root.join("outputs")
    }

    pub fn backups(&self) -> PathBuf {
        self.root.join("backups")
    }

    pub fn logs(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn destination(&self, outcome: FileOutcome) -> PathBuf {
        self.root.join(outcome.to_string())
    }

    /// Create the working directories the run writes into
    pub fn ensure(&self) -> Result<()> {
        for dir in [
            self.outputs(),
            self.backups(),
            self.logs(),
            self.destination(FileOutcome::Complete),
            self.destination(FileOutcome::Errors),
        ] {
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}

/// Input sheets directly under `dir`, sorted by name
pub fn list_spreadsheets(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Outcome of every file the sweep reached
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub complete: Vec<PathBuf>,
    pub errors: Vec<PathBuf>,
}

impl SweepReport {
    pub fn record(&mut self, path: &Path, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Complete => self.complete.push(path.to_path_buf()),
            FileOutcome::Errors => self.errors.push(path.to_path_buf()),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn entries(&self) -> impl Iterator<Item = (&PathBuf, FileOutcome)> {
        self.complete
            .iter()
            .map(|p| (p, FileOutcome::Complete))
            .chain(self.errors.iter().map(|p| (p, FileOutcome::Errors)))
    }
}

/// Run the pipeline over `files`, recording each outcome in `report`
///
/// Stops at the first run-fatal error; the file it happened in is recorded
/// as `errors` before the error is returned.
pub async fn sweep(
    files: &[PathBuf],
    ctx: &RunContext<'_>,
    report: &mut SweepReport,
) -> Result<()> {
    for file in files {
        log::debug!("{}", file.display());
        match process_file(file, ctx).await {
            Ok(summary) => {
                log::info!(
                    "{}: {} ({} written, {} skipped{})",
                    file.display(),
                    summary.outcome,
                    summary.rows_written,
                    summary.rows_skipped,
                    summary
                        .output
                        .as_ref()
                        .map(|p| format!(", output {}", p.display()))
                        .unwrap_or_default()
                );
                report.record(file, summary.outcome);
            }
            Err(e) => {
                report.record(file, FileOutcome::Errors);
                return Err(e);
            }
        }
    }
    Ok(())
}

fn move_file(source: &Path, dest: &Path) -> std::io::Result<()> {
    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        // the drive may be a different mount than the destination
        Err(_) => {
            fs::copy(source, dest)?;
            fs::remove_file(source)
        }
    }
}

/// Move every reported file into `complete/` or `errors/`; returns the moves made
pub fn relocate(report: &SweepReport, layout: &DriveLayout) -> Vec<(PathBuf, PathBuf)> {
    let mut moved = Vec::new();

    for (source, outcome) in report.entries() {
        let Some(name) = source.file_name() else {
            continue;
        };
        let dir = layout.destination(outcome);
        if let Err(e) = fs::create_dir_all(&dir) {
            log::error!("Cannot create {}: {}", dir.display(), e);
            continue;
        }

        let dest = dir.join(name);
        log::debug!("Moving: {} --> {}", source.display(), dest.display());
        match move_file(source, &dest) {
            Ok(()) => moved.push((source.clone(), dest)),
            Err(e) => log::error!("Failed to move {}: {}", source.display(), e),
        }
    }

    moved
}
