//! # Infrastructure Layer
//!
//! Concrete implementations of the collaborators the verification engine
//! depends on.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: MySQL record store using SQLx, plus schema management
//! - **Mail**: mail providers (mock, HTTP API) and the adapter implementing
//!   the core dispatcher trait
//!
//! ## Features
//!
//! - `mysql`: Enable the MySQL record store (default)

// Re-export core types for convenience
pub use vmail_core::errors::*;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Mail module - outbound verification messages
pub mod mail;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Mail service error
    #[error("Mail service error: {0}")]
    Mail(String),
}
