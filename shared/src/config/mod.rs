//! Configuration module with business-specific sub-modules
//!
//! Every value is read from a `VMAIL_`-prefixed environment variable with a
//! documented default:
//! - `database` - Record store selection and pool sizing
//! - `environment` - Environment detection and logging configuration
//! - `mail` - Mail provider and sender identity
//! - `server` - HTTP bind address and accepted API keys
//! - `verification` - OTP length, key seed, expiration and retry limits

pub mod database;
pub mod environment;
pub mod mail;
pub mod server;
pub mod verification;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub use database::{DatabaseConfig, MEMORY_DATABASE_URL};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use mail::{MailConfig, MAIL_RETRY_BASE_DELAY_MS};
pub use server::ServerConfig;
pub use verification::{
    VerificationConfig, MAX_OTP_DIGITS, MAX_VERIFY_TIMEOUT_SECONDS, TOKEN_PLACEHOLDER,
};

/// Prefix shared by every environment variable the service reads
pub const ENV_PREFIX: &str = "VMAIL_";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for VMAIL_{key}: {message}")]
    Invalid { key: String, message: String },

    #[error("Failed to read env file {path}: {message}")]
    EnvFile { path: String, message: String },
}

/// Source of raw configuration values, looked up by un-prefixed key
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads `VMAIL_{key}` from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ConfigSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Parse `key` from the source, falling back to `default` when unset
pub fn parse_or<T>(source: &impl ConfigSource, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match source.get(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key: key.to_string(),
            message: format!("{} ({:?})", e, raw),
        }),
        None => Ok(default),
    }
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Verification workflow configuration
    pub verification: VerificationConfig,

    /// Mail delivery configuration
    pub mail: MailConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            verification: VerificationConfig::default(),
            mail: MailConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load an env file (if present) and then read the process environment
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load(env_file: Option<&Path>) -> Result<Self, ConfigError> {
        let path = env_file.unwrap_or_else(|| Path::new(".env"));
        match dotenvy::from_path(path) {
            Ok(()) => {}
            Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ConfigError::EnvFile {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })
            }
        }
        Self::from_source(&ProcessEnv)
    }

    /// Build configuration from an arbitrary source
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        let environment = Environment::from_source(source)?;
        let config = Self {
            environment,
            server: ServerConfig::from_source(source)?,
            database: DatabaseConfig::from_source(source)?,
            verification: VerificationConfig::from_source(source)?,
            mail: MailConfig::from_source(source)?,
            logging: LoggingConfig::from_source(source, environment)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// The engine cancels a dispatch after `dispatch_timeout_seconds`, so the
    /// HTTP provider's retries must fit inside it
    fn validate(&self) -> Result<(), ConfigError> {
        let budget_ms = self.verification.dispatch_timeout_seconds.saturating_mul(1000);
        if self.mail.provider == "http" && self.mail.worst_case_send_millis() > budget_ms {
            return Err(ConfigError::Invalid {
                key: "MAIL_MAX_RETRIES".to_string(),
                message: format!(
                    "retries can take {} ms, longer than VMAIL_DISPATCH_TIMEOUT_SECONDS ({} s)",
                    self.mail.worst_case_send_millis(),
                    self.verification.dispatch_timeout_seconds
                ),
            });
        }
        Ok(())
    }
}
