//! Database configuration module

use serde::{Deserialize, Serialize};

use super::{parse_or, ConfigError, ConfigSource};

/// URL scheme selecting the in-process record store
pub const MEMORY_DATABASE_URL: &str = "memory://";

/// Database configuration for the verification record store
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database connection URL (`mysql://...` or `memory://`)
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Connection timeout in seconds
    pub connect_timeout: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout: u64,

    /// Maximum lifetime of a connection in seconds
    pub max_lifetime: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::from(MEMORY_DATABASE_URL),
            max_connections: 10,
            connect_timeout: 30,
            idle_timeout: 600,
            max_lifetime: 1800,
        }
    }
}

impl DatabaseConfig {
    /// Read `VMAIL_DATABASE_*` variables
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            url: source.get("DATABASE_URL").unwrap_or(defaults.url),
            max_connections: parse_or(source, "DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            connect_timeout: parse_or(source, "DATABASE_CONNECT_TIMEOUT", defaults.connect_timeout)?,
            ..defaults
        })
    }

    /// Create a new database configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the maximum number of connections
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Whether records live in process memory instead of MySQL
    pub fn is_memory(&self) -> bool {
        self.url.starts_with(MEMORY_DATABASE_URL)
    }
}
