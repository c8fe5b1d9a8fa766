//! receiptkeep CLI - Command-line interface for backup import and export
//!
//! Merges exported backups into the local database and reports what changed.

mod cli;
mod commands;
mod config;
mod error;
#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::common::Context;
use crate::commands::config::run_config;
use crate::commands::export::run_export;
use crate::commands::import::run_import;
use crate::commands::summary::run_summary;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "receiptkeep=info"
                    .parse()
                    .map_err(|error| CliError::Config(format!("{error}")))?,
            ),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let context = Context::resolve(cli.config_file, cli.db_path)?;

    match cli.command {
        Commands::Import { backup, mode, json } => {
            run_import(&backup, mode.map(Into::into), json, &context).await?;
        }
        Commands::Export { path } => run_export(&path, &context).await?,
        Commands::Summary { json } => run_summary(json, &context).await?,
        Commands::Config { command } => run_config(command, context)?,
    }

    Ok(())
}
