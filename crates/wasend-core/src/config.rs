use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::{
    credentials::{WhatsAppCredentials, GRAPH_API_BASE_URL},
    error::WasendError,
};

/// Top-level wasend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Capture per-item failures as `{ "error": ... }` instead of aborting.
    #[serde(default)]
    pub continue_on_fail: bool,
    /// Graph API host; the version segment is appended.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub credentials: WhatsAppCredentials,
    /// Node parameters using the host-facing names (`phoneNumber`, ...).
    #[serde(default = "default_parameters")]
    pub parameters: Value,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            continue_on_fail: false,
            api_base_url: default_api_base_url(),
            credentials: WhatsAppCredentials::default(),
            parameters: default_parameters(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_api_base_url() -> String {
    GRAPH_API_BASE_URL.to_string()
}
fn default_parameters() -> Value {
    Value::Object(Default::default())
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, WasendError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| WasendError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| WasendError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
