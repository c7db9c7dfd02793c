//! Record store trait defining the interface for verification persistence.
//!
//! Every mutating operation must be atomic with respect to other mutations
//! on the same key or token. Implementations live in the infrastructure
//! layer (MySQL) and in [`super::memory`] for tests and single-process use.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::VerificationRecord;
use crate::errors::DomainError;

/// Repository trait for verification record persistence
///
/// # Example Implementation
/// ```no_run
/// use async_trait::async_trait;
/// use chrono::{DateTime, Utc};
/// use vmail_core::repositories::VerificationRepository;
/// use vmail_core::domain::entities::VerificationRecord;
/// use vmail_core::errors::DomainError;
///
/// struct SqliteVerificationRepository {
///     // connection pool
/// }
///
/// #[async_trait]
/// impl VerificationRepository for SqliteVerificationRepository {
///     async fn create_or_ignore(
///         &self,
///         key: &str,
///         created_at: DateTime<Utc>,
///     ) -> Result<(), DomainError> {
///         // INSERT ... ON CONFLICT DO NOTHING
///         Ok(())
///     }
///
///     // ... other methods
/// #   async fn get_by_key(&self, _: &str) -> Result<Option<VerificationRecord>, DomainError> { Ok(None) }
/// #   async fn get_by_token(&self, _: &str) -> Result<Option<VerificationRecord>, DomainError> { Ok(None) }
/// #   async fn set_token(&self, _: &str, _: &str, _: DateTime<Utc>) -> Result<(), DomainError> { Ok(()) }
/// #   async fn mark_verified(&self, _: &str, _: DateTime<Utc>) -> Result<(), DomainError> { Ok(()) }
/// #   async fn clear_all(&self) -> Result<u64, DomainError> { Ok(0) }
/// }
/// ```
#[async_trait]
pub trait VerificationRepository: Send + Sync {
    /// Insert a record holding only `created_at` unless one already exists
    ///
    /// Duplicate registrations are expected; an existing key is a silent no-op.
    async fn create_or_ignore(&self, key: &str, created_at: DateTime<Utc>)
        -> Result<(), DomainError>;

    /// Find a record by its address key
    ///
    /// # Returns
    /// * `Ok(Some(record))` - Record found
    /// * `Ok(None)` - No record for this key
    /// * `Err(DomainError)` - Store error occurred
    async fn get_by_key(&self, key: &str) -> Result<Option<VerificationRecord>, DomainError>;

    /// Find the record currently holding `token`
    async fn get_by_token(&self, token: &str) -> Result<Option<VerificationRecord>, DomainError>;

    /// Set `token` and `requested_at` together on the record for `key`
    ///
    /// # Errors
    /// * `DomainError::NotFound` - No record exists for the key
    /// * `DomainError::Conflict` - The token is held by a different record
    async fn set_token(
        &self,
        key: &str,
        token: &str,
        requested_at: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    /// Stamp `verified_at` on the record holding `token` and clear the token
    ///
    /// # Errors
    /// * `DomainError::NotFound` - No record currently holds the token
    async fn mark_verified(&self, token: &str, verified_at: DateTime<Utc>)
        -> Result<(), DomainError>;

    /// Delete every record, returning how many were removed
    async fn clear_all(&self) -> Result<u64, DomainError>;

    /// Whether any record currently holds `token`
    async fn token_exists(&self, token: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_token(token).await?.is_some())
    }
}
