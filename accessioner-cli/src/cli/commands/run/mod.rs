//! `run` command: the full accessioning sweep

pub mod handler;

use std::path::PathBuf;

use clap::Args;

use crate::config::Environment;

pub use handler::handle_run_command;

#[derive(Args, Debug)]
pub struct RunCommands {
    /// Config file (defaults to ./config.toml, then the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Target instance; inferred from the drive path when omitted
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Folder holding the input spreadsheets (overrides the configured drive path)
    #[arg(short, long)]
    pub drive: Option<PathBuf>,

    /// Debug-level console logging
    #[arg(short, long)]
    pub verbose: bool,

    /// No per-row console output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
