//! Shared utilities and common types for the vmail server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration loaded from `VMAIL_` environment variables
//! - Error response structures
//! - Email normalization, validation and masking

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ConfigError, DatabaseConfig, Environment, LogFormat, LoggingConfig, MailConfig,
    ServerConfig, VerificationConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use utils::{mask_email, normalize_email, validate_email, EmailValidation};
