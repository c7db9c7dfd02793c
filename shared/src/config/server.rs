//! Server configuration module

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{parse_or, ConfigError, ConfigSource};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Worker threads (0 = number of CPU cores)
    #[serde(default)]
    pub workers: usize,

    /// Keep-alive timeout in seconds
    #[serde(default = "default_keep_alive")]
    pub keep_alive: u64,

    /// Accepted `X-API-Key` values, keyed by client name
    pub api_keys: HashMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8001,
            workers: 0,
            keep_alive: default_keep_alive(),
            api_keys: default_api_keys(),
        }
    }
}

impl ServerConfig {
    /// Read `VMAIL_HOST`, `VMAIL_PORT`, `VMAIL_WORKERS` and `VMAIL_API_KEYS`
    ///
    /// `VMAIL_API_KEYS` is a JSON object mapping client names to keys.
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let api_keys = match source.get("API_KEYS") {
            Some(raw) => serde_json::from_str::<HashMap<String, String>>(&raw).map_err(|e| {
                ConfigError::Invalid {
                    key: "API_KEYS".to_string(),
                    message: e.to_string(),
                }
            })?,
            None => defaults.api_keys,
        };

        let config = Self {
            host: source.get("HOST").unwrap_or(defaults.host),
            port: parse_or(source, "PORT", defaults.port)?,
            workers: parse_or(source, "WORKERS", defaults.workers)?,
            keep_alive: parse_or(source, "KEEP_ALIVE", defaults.keep_alive)?,
            api_keys,
        };
        config.validate()?;
        Ok(config)
    }

    /// Get the bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check whether a presented key is one of the configured API keys
    pub fn accepts_api_key(&self, presented: &str) -> bool {
        self.api_keys.values().any(|key| key == presented)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_keys.values().all(|key| key.is_empty()) {
            return Err(ConfigError::Invalid {
                key: "API_KEYS".to_string(),
                message: "at least one non-empty API key is required".to_string(),
            });
        }
        Ok(())
    }
}

fn default_keep_alive() -> u64 {
    75
}

fn default_api_keys() -> HashMap<String, String> {
    HashMap::from([("test".to_string(), "test".to_string())])
}
