//! Fieldtrack CLI application
//!
//! Drives the fieldtrack engine from a terminal: inspect today's state,
//! run a tracked work session, and replay recorded paths. Device GPS is
//! stood in for by a route file; real integrations implement the
//! engine's `LocationProvider` trait instead.

mod args;
mod commands;
mod host;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with environment-based filtering
    // Set RUST_LOG=debug for verbose logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    match cli.command {
        Commands::Status => commands::status(config).await,
        Commands::Track { description, route } => commands::track(config, description, route).await,
        Commands::Stop => commands::stop(config).await,
        Commands::Replay { session_id, follow } => {
            commands::replay(config, session_id, follow).await
        }
        Commands::History { username } => commands::history(config, username).await,
    }
}
