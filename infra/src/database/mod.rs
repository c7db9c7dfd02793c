//! Database module - MySQL implementations using SQLx
//!
//! This module provides the database access layer:
//! - Connection pool management
//! - Schema creation for the `initialize` admin command
//! - The MySQL record store

pub mod connection;
pub mod mysql;
pub mod schema;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::MySqlVerificationRepository;
pub use schema::{initialize_schema, EMAIL_VERIFICATIONS_TABLE};
