//! Domain-specific error types and error handling.

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Dispatch failed: {message}")]
    DispatchFailure { message: String },

    #[error("Record store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    /// Shorthand for a missing verification record
    pub fn record_not_found() -> Self {
        DomainError::NotFound {
            resource: "VerificationRecord".to_string(),
        }
    }

    /// Shorthand for a token already held by another record
    pub fn token_conflict() -> Self {
        DomainError::Conflict {
            message: "Token is already held by another record".to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, DomainError::Conflict { .. })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
