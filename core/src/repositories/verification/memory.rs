//! In-process implementation of VerificationRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::VerificationRecord;
use crate::errors::DomainError;

use super::trait_::VerificationRepository;

#[derive(Default)]
struct Tables {
    records: HashMap<String, VerificationRecord>,
    /// token -> key for every record holding a token
    tokens: HashMap<String, String>,
}

/// Record store held in process memory
///
/// All mutations take the write lock, so operations on the same key or
/// token never interleave. Used for the `memory://` database URL and tests.
#[derive(Clone, Default)]
pub struct InMemoryVerificationRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryVerificationRepository {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.tables.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Insert or replace a record as-is, keeping the token index in step
    ///
    /// Lets tests seed states the engine would not produce on its own.
    pub async fn insert(&self, record: VerificationRecord) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        if let Some(token) = &record.token {
            if let Some(holder) = tables.tokens.get(token) {
                if holder != &record.key {
                    return Err(DomainError::token_conflict());
                }
            }
        }
        if let Some(previous) = tables.records.remove(&record.key) {
            if let Some(old_token) = previous.token {
                tables.tokens.remove(&old_token);
            }
        }
        if let Some(token) = &record.token {
            tables.tokens.insert(token.clone(), record.key.clone());
        }
        tables.records.insert(record.key.clone(), record);
        Ok(())
    }
}

#[async_trait]
impl VerificationRepository for InMemoryVerificationRepository {
    async fn create_or_ignore(
        &self,
        key: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        tables
            .records
            .entry(key.to_string())
            .or_insert_with(|| VerificationRecord::new(key, created_at));
        Ok(())
    }

    async fn get_by_key(&self, key: &str) -> Result<Option<VerificationRecord>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.records.get(key).cloned())
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<VerificationRecord>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tokens
            .get(token)
            .and_then(|key| tables.records.get(key))
            .cloned())
    }

    async fn set_token(
        &self,
        key: &str,
        token: &str,
        requested_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;

        if !tables.records.contains_key(key) {
            return Err(DomainError::record_not_found());
        }
        if let Some(holder) = tables.tokens.get(token) {
            if holder != key {
                return Err(DomainError::token_conflict());
            }
        }

        let record = tables
            .records
            .get_mut(key)
            .ok_or_else(DomainError::record_not_found)?;
        if let Some(old_token) = record.token.take() {
            tables.tokens.remove(&old_token);
        }
        record.issue_token(token, requested_at);
        tables.tokens.insert(token.to_string(), key.to_string());
        Ok(())
    }

    async fn mark_verified(
        &self,
        token: &str,
        verified_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;

        let key = tables
            .tokens
            .remove(token)
            .ok_or_else(DomainError::record_not_found)?;
        let record = tables
            .records
            .get_mut(&key)
            .ok_or_else(DomainError::record_not_found)?;
        record.confirm(verified_at);
        Ok(())
    }

    async fn clear_all(&self) -> Result<u64, DomainError> {
        let mut tables = self.tables.write().await;
        let removed = tables.records.len() as u64;
        tables.records.clear();
        tables.tokens.clear();
        Ok(removed)
    }
}
