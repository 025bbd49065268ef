//! `validate` command: offline sheet checks

pub mod handler;

use std::path::PathBuf;

use clap::Args;

pub use handler::handle_validate_command;

#[derive(Args, Debug)]
pub struct ValidateCommands {
    /// Sheets to check; defaults to every spreadsheet on the configured drive
    pub files: Vec<PathBuf>,

    /// Config file used to locate the drive when no files are given
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Folder holding the input spreadsheets
    #[arg(short, long)]
    pub drive: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
