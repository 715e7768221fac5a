//! Client configuration file support.
//!
//! Configuration is read from a TOML file, with environment variables taking
//! precedence so deployments can override a checked-in file.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Client configuration for talking to the Greenie backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreenieConfig {
    pub api: ApiSettings,
}

/// Backend API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the backend, e.g. `https://api.greenie.app`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Squadron username whose board this client displays
    #[serde(default)]
    pub squadron: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            squadron: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

impl GreenieConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns `Error::Config` if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let mut config: GreenieConfig = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("invalid config file: {}", e)))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Build configuration from environment variables alone.
    ///
    /// # Environment Variables
    /// - `GREENIE_API_URL` (optional): backend base URL
    /// - `GREENIE_SQUADRON` (optional): squadron username
    /// - `GREENIE_TIMEOUT_SECS` (optional): request timeout in seconds
    pub fn from_env() -> Result<Self> {
        let mut config = GreenieConfig {
            api: ApiSettings::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("GREENIE_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(squadron) = env::var("GREENIE_SQUADRON") {
            self.api.squadron = squadron;
        }
        if let Ok(timeout) = env::var("GREENIE_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.api.timeout_secs = secs;
            }
        }
    }
}
