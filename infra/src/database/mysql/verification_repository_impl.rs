//! MySQL implementation of the VerificationRepository trait.
//!
//! Every mutation is a single statement, so per-key atomicity comes from
//! InnoDB row locking and global token uniqueness from the UNIQUE index
//! on `token`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use vmail_core::domain::entities::VerificationRecord;
use vmail_core::errors::DomainError;
use vmail_core::repositories::VerificationRepository;

/// MySQL implementation of VerificationRepository
#[derive(Clone)]
pub struct MySqlVerificationRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlVerificationRepository {
    /// Create a new MySQL verification repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to VerificationRecord entity
    fn row_to_record(row: &sqlx::mysql::MySqlRow) -> Result<VerificationRecord, DomainError> {
        Ok(VerificationRecord {
            key: row
                .try_get("address_key")
                .map_err(|e| internal("address_key", e))?,
            token: row.try_get("token").map_err(|e| internal("token", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| internal("created_at", e))?,
            requested_at: row
                .try_get::<Option<DateTime<Utc>>, _>("requested_at")
                .map_err(|e| internal("requested_at", e))?,
            verified_at: row
                .try_get::<Option<DateTime<Utc>>, _>("verified_at")
                .map_err(|e| internal("verified_at", e))?,
        })
    }

    async fn key_exists(&self, key: &str) -> Result<bool, DomainError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM email_verifications WHERE address_key = ?")
            .bind(key)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("check record", e))?;
        let n: i64 = row.try_get("n").map_err(|e| internal("n", e))?;
        Ok(n > 0)
    }
}

fn internal(column: &str, e: sqlx::Error) -> DomainError {
    DomainError::Internal {
        message: format!("Failed to get {}: {}", column, e),
    }
}

/// Translate sqlx errors into the domain taxonomy
pub(crate) fn map_sqlx_error(operation: &str, e: sqlx::Error) -> DomainError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => DomainError::token_conflict(),
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => {
            tracing::error!(
                operation = operation,
                error = %e,
                event = "store_unavailable",
                "Record store unreachable"
            );
            DomainError::StoreUnavailable {
                message: format!("Failed to {}: {}", operation, e),
            }
        }
        other => DomainError::Internal {
            message: format!("Failed to {}: {}", operation, other),
        },
    }
}

#[async_trait]
impl VerificationRepository for MySqlVerificationRepository {
    async fn create_or_ignore(
        &self,
        key: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let query = r#"
            INSERT IGNORE INTO email_verifications (address_key, created_at)
            VALUES (?, ?)
        "#;

        sqlx::query(query)
            .bind(key)
            .bind(created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create record", e))?;

        Ok(())
    }

    async fn get_by_key(&self, key: &str) -> Result<Option<VerificationRecord>, DomainError> {
        let query = r#"
            SELECT address_key, token, created_at, requested_at, verified_at
            FROM email_verifications
            WHERE address_key = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find record by key", e))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<VerificationRecord>, DomainError> {
        let query = r#"
            SELECT address_key, token, created_at, requested_at, verified_at
            FROM email_verifications
            WHERE token = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find record by token", e))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn set_token(
        &self,
        key: &str,
        token: &str,
        requested_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let query = r#"
            UPDATE email_verifications
            SET token = ?, requested_at = ?
            WHERE address_key = ?
        "#;

        let result = sqlx::query(query)
            .bind(token)
            .bind(requested_at)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("set token", e))?;

        // Zero rows can also mean the row already held these exact values
        if result.rows_affected() == 0 && !self.key_exists(key).await? {
            return Err(DomainError::record_not_found());
        }
        Ok(())
    }

    async fn mark_verified(
        &self,
        token: &str,
        verified_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let query = r#"
            UPDATE email_verifications
            SET verified_at = ?, token = NULL
            WHERE token = ?
        "#;

        let result = sqlx::query(query)
            .bind(verified_at)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("mark verified", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::record_not_found());
        }
        Ok(())
    }

    async fn clear_all(&self) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM email_verifications")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("clear records", e))?;

        Ok(result.rows_affected())
    }

    async fn token_exists(&self, token: &str) -> Result<bool, DomainError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM email_verifications WHERE token = ?")
            .bind(token)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("check token", e))?;
        let n: i64 = row.try_get("n").map_err(|e| internal("n", e))?;
        Ok(n > 0)
    }
}
