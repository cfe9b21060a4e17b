//! GraphIt - Main Entry Point
//!
//! Command-line front end for the GraphIt client core.

mod cli;
mod commands;
mod definition;

use std::process::ExitCode;

use clap::Parser;
use graphit_infrastructure::logging;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    if cli.debug {
        logging::init_with_default("debug");
    } else {
        logging::init();
    }

    let settings = commands::load_settings(cli.settings.as_deref()).await?;
    tracing::debug!(?settings, "Loaded settings");

    match &cli.command {
        Command::Run(args) => commands::run::execute(args, &settings).await,
        Command::Subscribe(args) => commands::subscribe::execute(args, &settings).await,
        Command::Schema(args) => commands::schema::execute(args, &settings).await,
        Command::Operations(args) => commands::document::operations(args).await,
        Command::Format(args) => commands::document::format(args).await,
        Command::Minify(args) => commands::document::minify(args).await,
    }
}
