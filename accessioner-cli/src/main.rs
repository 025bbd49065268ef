mod accession;
mod api;
mod cli;
mod config;
mod error;
mod logging;
mod services;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => cli::commands::run::handle_run_command(args).await,
        Commands::Validate(args) => {
            logging::init(None, false)?;
            cli::commands::validate::handle_validate_command(args)
        }
    }
}
