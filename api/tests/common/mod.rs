//! Shared fixtures for the API integration tests

#![allow(dead_code)]

use actix_web::web;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

use vmail_api::AppState;
use vmail_core::domain::entities::VerificationRecord;
use vmail_core::errors::DomainError;
use vmail_core::repositories::{InMemoryVerificationRepository, VerificationRepository};
use vmail_core::services::verification::{
    SequenceCodeGenerator, VerificationService, VerificationServiceConfig,
};
use vmail_core::services::ManualClock;
use vmail_infra::mail::{MailServiceAdapter, MockMailService};

pub const API_KEY: &str = "test";

pub type MemoryState = AppState<InMemoryVerificationRepository, MailServiceAdapter>;

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// Service over the in-memory store whose OTPs are `codes`, in order
pub fn memory_state(
    mailbox: MockMailService,
    clock: Arc<ManualClock>,
    codes: &[&str],
) -> web::Data<MemoryState> {
    let service = VerificationService::new(
        Arc::new(InMemoryVerificationRepository::new()),
        Arc::new(MailServiceAdapter::new(Box::new(mailbox), "Verify your email address")),
        VerificationServiceConfig::default(),
    )
    .with_clock(clock)
    .with_code_generator(Arc::new(SequenceCodeGenerator::new(codes.iter().copied())));
    web::Data::new(AppState::new(Arc::new(service)))
}

/// Record store whose backend is unreachable
pub struct UnreachableRepository;

fn unreachable() -> DomainError {
    DomainError::StoreUnavailable {
        message: "connection refused".to_string(),
    }
}

#[async_trait]
impl VerificationRepository for UnreachableRepository {
    async fn create_or_ignore(&self, _: &str, _: DateTime<Utc>) -> Result<(), DomainError> {
        Err(unreachable())
    }

    async fn get_by_key(&self, _: &str) -> Result<Option<VerificationRecord>, DomainError> {
        Err(unreachable())
    }

    async fn get_by_token(&self, _: &str) -> Result<Option<VerificationRecord>, DomainError> {
        Err(unreachable())
    }

    async fn set_token(&self, _: &str, _: &str, _: DateTime<Utc>) -> Result<(), DomainError> {
        Err(unreachable())
    }

    async fn mark_verified(&self, _: &str, _: DateTime<Utc>) -> Result<(), DomainError> {
        Err(unreachable())
    }

    async fn clear_all(&self) -> Result<u64, DomainError> {
        Err(unreachable())
    }
}

pub fn unreachable_state() -> web::Data<AppState<UnreachableRepository, MailServiceAdapter>> {
    let service = VerificationService::new(
        Arc::new(UnreachableRepository),
        Arc::new(MailServiceAdapter::new(Box::new(MockMailService::new()), "Verify")),
        VerificationServiceConfig::default(),
    );
    web::Data::new(AppState::new(Arc::new(service)))
}
