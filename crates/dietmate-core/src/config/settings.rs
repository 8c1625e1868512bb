use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,

    #[serde(default)]
    pub daemon: DaemonConfig,
}

impl Config {
    /// Load config from file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        super::validation::warn_unknown_fields(&content, "config.json");
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }
}

/// Where the application's pages live
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// URL opened when a click finds no existing window
    #[serde(default = "default_root_url")]
    pub root_url: String,

    /// Substring identifying the main page among open windows
    #[serde(default = "default_main_page_marker")]
    pub main_page_marker: String,
}

fn default_root_url() -> String {
    "./".to_string()
}

fn default_main_page_marker() -> String {
    "index".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root_url: default_root_url(),
            main_page_marker: default_main_page_marker(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonConfig {
    /// How long a host primitive may take before the event is failed
    #[serde(default = "default_host_request_timeout")]
    pub host_request_timeout_ms: u64,
}

fn default_host_request_timeout() -> u64 {
    30_000
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host_request_timeout_ms: default_host_request_timeout(),
        }
    }
}

impl DaemonConfig {
    #[must_use]
    pub fn host_request_timeout(&self) -> Duration {
        Duration::from_millis(self.host_request_timeout_ms)
    }
}
