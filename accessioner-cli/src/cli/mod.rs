//! Command-line interface

pub mod commands;

use clap::{Parser, Subcommand};

use commands::{RunCommands, ValidateCommands};

#[derive(Parser)]
#[command(name = "accessioner")]
#[command(about = "Create and update ArchivesSpace archival objects from accession spreadsheets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process every spreadsheet on the drive against ArchivesSpace
    Run(RunCommands),
    /// Check spreadsheets offline without contacting ArchivesSpace
    Validate(ValidateCommands),
}
