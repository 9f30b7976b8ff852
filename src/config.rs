//! Client configuration (~/.contask/config.json).

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_poll_interval() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the contract API server.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Unread-notification poll period in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

/// Canonical config file path (~/.contask/config.json).
pub fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".contask")
        .join("config.json")
}

/// Load configuration, falling back to defaults when the file is missing.
pub fn load_config() -> Result<ClientConfig, String> {
    let path = config_path();
    if !path.exists() {
        return Ok(ClientConfig::default());
    }
    let content =
        fs::read_to_string(&path).map_err(|e| format!("Failed to read config: {}", e))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
}
