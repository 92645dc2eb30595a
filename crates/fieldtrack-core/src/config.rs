//! Tracker configuration

use crate::error::{TrackError, TrackResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Remote authority connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the authority API, e.g. `http://localhost:5000/api`
    pub base_url: String,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
        }
    }
}

impl RemoteConfig {
    /// Connection timeout as a `Duration`
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Top-level tracker configuration
///
/// Sampling cadence, playback cadence, and the movement threshold are
/// policy constants owned by their modules, not configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Identifier of the worker whose sessions are tracked
    #[serde(default)]
    pub worker_id: String,
}

impl TrackerConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> TrackResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| TrackError::config(format!("failed to read {}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| TrackError::config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Load from a file if it exists, otherwise fall back to defaults
    pub fn from_file_or_default(path: &Path) -> TrackResult<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Override the authority base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.remote.base_url = base_url.into();
        self
    }

    /// Override the worker identifier
    pub fn with_worker_id(mut self, worker_id: impl Into<String>) -> Self {
        self.worker_id = worker_id.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_config_default() {
        let config = RemoteConfig::default();
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.base_url.starts_with("http://"));
    }

    #[test]
    fn test_config_parse() {
        let raw = r#"{
            "remote": { "base_url": "http://tracker.example:5000/api",
                        "connect_timeout_secs": 5,
                        "request_timeout_secs": 20 },
            "worker_id": "42"
        }"#;
        let config: TrackerConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.remote.base_url, "http://tracker.example:5000/api");
        assert_eq!(config.worker_id, "42");
        assert_eq!(config.remote.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_config_builders() {
        let config = TrackerConfig::default()
            .with_base_url("http://other:5000/api")
            .with_worker_id("7");
        assert_eq!(config.remote.base_url, "http://other:5000/api");
        assert_eq!(config.worker_id, "7");
    }
}
