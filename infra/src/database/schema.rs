//! Schema for the verification record table

use sqlx::MySqlPool;

use crate::InfrastructureError;

/// Table holding one row per address key
pub const EMAIL_VERIFICATIONS_TABLE: &str = "email_verifications";

/// `token` is unique while present; MySQL allows many NULLs in a UNIQUE index.
pub const CREATE_EMAIL_VERIFICATIONS: &str = r#"
    CREATE TABLE IF NOT EXISTS email_verifications (
        address_key CHAR(64) NOT NULL,
        token VARCHAR(16) NULL,
        created_at DATETIME(6) NOT NULL,
        requested_at DATETIME(6) NULL,
        verified_at DATETIME(6) NULL,
        PRIMARY KEY (address_key),
        UNIQUE KEY uq_email_verifications_token (token)
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_bin
"#;

/// Create the verification table if it does not exist
pub async fn initialize_schema(pool: &MySqlPool) -> Result<(), InfrastructureError> {
    sqlx::query(CREATE_EMAIL_VERIFICATIONS)
        .execute(pool)
        .await
        .map_err(InfrastructureError::Database)?;

    tracing::info!(
        table = EMAIL_VERIFICATIONS_TABLE,
        event = "schema_initialized",
        "Verification schema ready"
    );
    Ok(())
}
