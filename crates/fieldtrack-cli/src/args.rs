//! Command-line arguments

use anyhow::Result;
use clap::{Parser, Subcommand};
use fieldtrack_core::TrackerConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fieldtrack", version, about = "Track work sessions and replay recorded paths")]
pub struct Cli {
    /// Path to the tracker configuration file
    #[arg(long, global = true, default_value = "fieldtrack.json")]
    pub config: PathBuf,

    /// Remote authority base URL (overrides the config file)
    #[arg(long, global = true, env = "FIELDTRACK_BASE_URL")]
    pub base_url: Option<String>,

    /// Worker identifier (overrides the config file)
    #[arg(long, global = true, env = "FIELDTRACK_WORKER")]
    pub worker: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show today's work state for the worker
    Status,

    /// Start a work session and keep tracking until interrupted
    Track {
        /// Work description for the new session
        description: String,

        /// JSON file with route points standing in for device GPS
        #[arg(long)]
        route: PathBuf,
    },

    /// Stop the currently open work session
    Stop,

    /// Replay the recorded path of a session
    Replay {
        /// Session to replay
        session_id: i64,

        /// Keep polling for new points while the session is open
        #[arg(long)]
        follow: bool,
    },

    /// List recorded sessions for a worker account
    History {
        /// Account name as known to the authority
        username: String,
    },
}

impl Cli {
    /// Resolve the effective configuration: file (or defaults) plus
    /// command-line overrides
    pub fn load_config(&self) -> Result<TrackerConfig> {
        let mut config = TrackerConfig::from_file_or_default(&self.config)?;
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if let Some(worker) = &self.worker {
            config = config.with_worker_id(worker.clone());
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_args_parse() {
        let cli = Cli::parse_from([
            "fieldtrack",
            "track",
            "Paint fence",
            "--route",
            "route.json",
        ]);
        match cli.command {
            Commands::Track { description, route } => {
                assert_eq!(description, "Paint fence");
                assert_eq!(route, PathBuf::from("route.json"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::parse_from([
            "fieldtrack",
            "--base-url",
            "http://tracker.example:5000/api",
            "--worker",
            "42",
            "status",
        ]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.remote.base_url, "http://tracker.example:5000/api");
        assert_eq!(config.worker_id, "42");
    }
}
