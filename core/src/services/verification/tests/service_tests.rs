//! Unit tests for verification service

use chrono::{DateTime, Duration, TimeZone, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::domain::entities::{VerificationRecord, VerificationState};
use crate::errors::DomainError;
use crate::repositories::{InMemoryVerificationRepository, VerificationRepository};
use crate::services::clock::ManualClock;
use crate::services::verification::{
    RegisterOutcome, SequenceCodeGenerator, VerificationService, VerificationServiceConfig,
};

use super::mocks::{HijackingDispatcher, MockMailDispatcher};

const ADDRESS: &str = "a@b.com";

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn test_config() -> VerificationServiceConfig {
    VerificationServiceConfig {
        seed: "x".to_string(),
        dispatch_timeout: std::time::Duration::from_secs(1),
        ..VerificationServiceConfig::default()
    }
}

struct Harness<M: crate::services::verification::MailDispatcherTrait> {
    service: VerificationService<InMemoryVerificationRepository, M>,
    repo: Arc<InMemoryVerificationRepository>,
    mailer: Arc<M>,
    clock: Arc<ManualClock>,
}

fn harness_with<M>(
    repo: Arc<InMemoryVerificationRepository>,
    mailer: M,
    codes: Option<SequenceCodeGenerator>,
    config: VerificationServiceConfig,
) -> Harness<M>
where
    M: crate::services::verification::MailDispatcherTrait,
{
    let mailer = Arc::new(mailer);
    let clock = Arc::new(ManualClock::new(t0()));
    let mut service = VerificationService::new(repo.clone(), mailer.clone(), config)
        .with_clock(clock.clone());
    if let Some(codes) = codes {
        service = service.with_code_generator(Arc::new(codes));
    }
    Harness {
        service,
        repo,
        mailer,
        clock,
    }
}

fn harness(mailer: MockMailDispatcher) -> Harness<MockMailDispatcher> {
    harness_with(
        Arc::new(InMemoryVerificationRepository::new()),
        mailer,
        None,
        test_config(),
    )
}

fn scripted(codes: &[&str]) -> Harness<MockMailDispatcher> {
    harness_with(
        Arc::new(InMemoryVerificationRepository::new()),
        MockMailDispatcher::new(false),
        Some(SequenceCodeGenerator::new(codes.iter().copied())),
        test_config(),
    )
}

async fn stored(h: &Harness<impl crate::services::verification::MailDispatcherTrait>) -> VerificationRecord {
    let key = h.service.address_key(ADDRESS);
    h.repo.get_by_key(&key).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_unknown_address_and_token() {
    let h = harness(MockMailDispatcher::new(false));
    assert_eq!(h.service.read(ADDRESS).await.unwrap(), None);
    assert_eq!(
        h.service.confirm("123456", 3600).await.unwrap(),
        VerificationState::Unverified
    );
    assert!(!h.service.token_exists("123456").await.unwrap());
}

#[tokio::test]
async fn test_address_key_is_seeded_sha256() {
    let h = harness(MockMailDispatcher::new(false));
    let expected = hex::encode(Sha256::digest(b"xa@b.com"));
    assert_eq!(h.service.address_key(ADDRESS), expected);
}

#[tokio::test]
async fn test_register_dispatches_and_stores_token() {
    let h = harness(MockMailDispatcher::new(false));

    let outcome = h
        .service
        .register(ADDRESS, Some("Alice"), Some("Billing"))
        .await
        .unwrap();
    assert_eq!(outcome, RegisterOutcome::Pending);
    assert_eq!(h.mailer.sent_count(), 1);

    let email = h.mailer.last_email().unwrap();
    assert_eq!(email.address, ADDRESS);
    assert_eq!(email.token.len(), 6);
    assert!(email.token.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(
        email.verify_url,
        format!("http://localhost:8001/verify/{}", email.token)
    );
    assert_eq!(email.display_name.as_deref(), Some("Alice"));
    assert_eq!(email.application_name.as_deref(), Some("Billing"));

    let record = stored(&h).await;
    assert_eq!(record.token, Some(email.token));
    assert_eq!(record.requested_at, Some(t0()));
    assert_eq!(record.created_at, t0());
    assert_eq!(h.service.read(ADDRESS).await.unwrap(), Some(VerificationState::Unverified));
}

#[tokio::test]
async fn test_round_trip_within_window() {
    let h = harness(MockMailDispatcher::new(false));
    h.service.register(ADDRESS, None, None).await.unwrap();
    let token = h.mailer.last_token().unwrap();

    h.clock.advance(Duration::seconds(10));
    assert_eq!(
        h.service.confirm(&token, 3600).await.unwrap(),
        VerificationState::Verified
    );

    let record = stored(&h).await;
    assert_eq!(record.verified_at, Some(t0() + Duration::seconds(10)));
    assert!(record.token.is_none());
    assert_eq!(h.service.read(ADDRESS).await.unwrap(), Some(VerificationState::Verified));

    // Token was released, so a second redemption finds nothing
    assert_eq!(
        h.service.confirm(&token, 3600).await.unwrap(),
        VerificationState::Unverified
    );
}

#[tokio::test]
async fn test_second_register_supersedes_first_token() {
    let h = scripted(&["111111", "222222"]);
    h.service.register(ADDRESS, None, None).await.unwrap();
    h.clock.advance(Duration::seconds(5));
    h.service.register(ADDRESS, None, None).await.unwrap();
    assert_eq!(h.mailer.sent_count(), 2);

    assert_eq!(
        h.service.confirm("111111", 3600).await.unwrap(),
        VerificationState::Unverified
    );
    assert_eq!(
        h.service.confirm("222222", 3600).await.unwrap(),
        VerificationState::Verified
    );
}

#[tokio::test]
async fn test_register_verified_address_is_noop() {
    let h = harness(MockMailDispatcher::new(false));
    h.service.register(ADDRESS, None, None).await.unwrap();
    let token = h.mailer.last_token().unwrap();
    h.service.confirm(&token, 3600).await.unwrap();
    let before = stored(&h).await;

    for _ in 0..3 {
        h.clock.advance(Duration::hours(1));
        let outcome = h.service.register(ADDRESS, None, None).await.unwrap();
        assert_eq!(outcome, RegisterOutcome::AlreadyVerified);
    }

    assert_eq!(h.mailer.sent_count(), 1);
    assert_eq!(stored(&h).await, before);
}

#[tokio::test]
async fn test_confirm_after_window_is_expired_and_not_mutating() {
    let h = harness(MockMailDispatcher::new(false));
    h.service.register(ADDRESS, None, None).await.unwrap();
    let token = h.mailer.last_token().unwrap();
    let before = stored(&h).await;

    h.clock.advance(Duration::seconds(3601));
    assert_eq!(
        h.service.confirm(&token, 3600).await.unwrap(),
        VerificationState::Expired
    );
    assert_eq!(
        h.service.confirm(&token, 3600).await.unwrap(),
        VerificationState::Expired
    );

    assert_eq!(stored(&h).await, before);
    assert!(h.service.token_exists(&token).await.unwrap());
}

#[tokio::test]
async fn test_exact_window_boundary_still_verifies() {
    let h = harness(MockMailDispatcher::new(false));
    h.service.register(ADDRESS, None, None).await.unwrap();
    let token = h.mailer.last_token().unwrap();

    h.clock.advance(Duration::seconds(3600));
    assert_eq!(
        h.service.confirm(&token, 3600).await.unwrap(),
        VerificationState::Verified
    );
}

#[tokio::test]
async fn test_zero_expiration_only_accepts_zero_elapsed() {
    let h = scripted(&["111111", "222222"]);
    h.service.register(ADDRESS, None, None).await.unwrap();
    assert_eq!(
        h.service.confirm("111111", 0).await.unwrap(),
        VerificationState::Verified
    );

    h.service.register("other@b.com", None, None).await.unwrap();
    h.clock.advance(Duration::seconds(1));
    assert_eq!(
        h.service.confirm("222222", 0).await.unwrap(),
        VerificationState::Expired
    );
}

#[tokio::test]
async fn test_oversized_expiration_never_expires() {
    let h = harness(MockMailDispatcher::new(false));
    h.service.register(ADDRESS, None, None).await.unwrap();
    let token = h.mailer.last_token().unwrap();

    h.clock.advance(Duration::days(3650));
    assert_eq!(
        h.service.confirm(&token, i64::MAX).await.unwrap(),
        VerificationState::Verified
    );
}

#[tokio::test]
async fn test_register_after_expiry_issues_new_token() {
    let h = scripted(&["111111", "222222"]);
    h.service.register(ADDRESS, None, None).await.unwrap();
    h.clock.advance(Duration::hours(2));
    assert_eq!(
        h.service.confirm("111111", 3600).await.unwrap(),
        VerificationState::Expired
    );

    let outcome = h.service.register(ADDRESS, None, None).await.unwrap();
    assert_eq!(outcome, RegisterOutcome::Pending);
    assert!(!h.service.token_exists("111111").await.unwrap());
    assert_eq!(
        h.service.confirm("222222", 3600).await.unwrap(),
        VerificationState::Verified
    );
}

#[tokio::test]
async fn test_confirm_with_default_uses_configured_expiration() {
    let config = VerificationServiceConfig {
        expiration_seconds: 60,
        ..test_config()
    };
    let h = harness_with(
        Arc::new(InMemoryVerificationRepository::new()),
        MockMailDispatcher::new(false),
        None,
        config,
    );
    h.service.register(ADDRESS, None, None).await.unwrap();
    let token = h.mailer.last_token().unwrap();

    h.clock.advance(Duration::seconds(61));
    assert_eq!(
        h.service.confirm_with_default(&token).await.unwrap(),
        VerificationState::Expired
    );
}

#[tokio::test]
async fn test_dispatch_failure_leaves_record_untouched() {
    let h = harness(MockMailDispatcher::new(true));
    let outcome = h.service.register(ADDRESS, None, None).await.unwrap();
    assert_eq!(outcome, RegisterOutcome::DispatchFailed);

    let record = stored(&h).await;
    assert!(record.token.is_none());
    assert!(record.requested_at.is_none());
    assert_eq!(h.service.read(ADDRESS).await.unwrap(), Some(VerificationState::Unverified));
}

#[tokio::test]
async fn test_dispatch_failure_keeps_outstanding_token() {
    let repo = Arc::new(InMemoryVerificationRepository::new());
    let working = harness_with(
        repo.clone(),
        MockMailDispatcher::new(false),
        None,
        test_config(),
    );
    let failing = harness_with(repo, MockMailDispatcher::new(true), None, test_config());

    working.service.register(ADDRESS, None, None).await.unwrap();
    let token = working.mailer.last_token().unwrap();
    let before = stored(&working).await;

    let outcome = failing.service.register(ADDRESS, None, None).await.unwrap();
    assert_eq!(outcome, RegisterOutcome::DispatchFailed);
    assert_eq!(stored(&working).await, before);
    assert!(working.service.token_exists(&token).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_timeout_counts_as_failure() {
    let h = harness(MockMailDispatcher::slow(std::time::Duration::from_secs(30)));
    let outcome = h.service.register(ADDRESS, None, None).await.unwrap();
    assert_eq!(outcome, RegisterOutcome::DispatchFailed);
    assert!(stored(&h).await.token.is_none());
}

#[tokio::test]
async fn test_outstanding_token_is_skipped_before_dispatch() {
    let h = scripted(&["111111", "222222"]);
    let mut other = VerificationRecord::new("other-key", t0());
    other.issue_token("111111", t0());
    h.repo.insert(other).await.unwrap();

    let outcome = h.service.register(ADDRESS, None, None).await.unwrap();
    assert_eq!(outcome, RegisterOutcome::Pending);
    assert_eq!(h.mailer.sent_count(), 1);
    assert_eq!(stored(&h).await.token.as_deref(), Some("222222"));
}

#[tokio::test]
async fn test_collision_after_dispatch_is_retried() {
    let repo = Arc::new(InMemoryVerificationRepository::new());
    let h = harness_with(
        repo.clone(),
        HijackingDispatcher::new(repo, 1),
        Some(SequenceCodeGenerator::new(["111111", "222222"])),
        test_config(),
    );

    let outcome = h.service.register(ADDRESS, None, None).await.unwrap();
    assert_eq!(outcome, RegisterOutcome::Pending);
    assert_eq!(h.mailer.sent.load(Ordering::SeqCst), 2);
    assert_eq!(stored(&h).await.token.as_deref(), Some("222222"));
}

#[tokio::test]
async fn test_collision_retries_are_bounded() {
    let repo = Arc::new(InMemoryVerificationRepository::new());
    let h = harness_with(
        repo.clone(),
        HijackingDispatcher::new(repo, 10),
        Some(SequenceCodeGenerator::new(["111111", "222222", "333333", "444444"])),
        test_config(),
    );

    let err = h.service.register(ADDRESS, None, None).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict { .. }));
    assert_eq!(h.mailer.sent.load(Ordering::SeqCst), 3);

    let record = stored(&h).await;
    assert!(record.token.is_none());
    assert!(record.requested_at.is_none());
}

#[tokio::test]
async fn test_concurrent_registrations_get_distinct_tokens() {
    let h = harness(MockMailDispatcher::new(false));
    let service = Arc::new(h.service);

    let mut handles = Vec::new();
    for i in 0..20 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .register(&format!("user{}@example.com", i), None, None)
                .await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), RegisterOutcome::Pending);
    }

    let tokens: HashSet<String> = h
        .mailer
        .sent
        .lock()
        .unwrap()
        .iter()
        .map(|e| e.token.clone())
        .collect();
    assert_eq!(tokens.len(), 20);
    for token in &tokens {
        assert!(service.token_exists(token).await.unwrap());
    }
}

#[tokio::test]
async fn test_clear_all_forgets_addresses() {
    let h = harness(MockMailDispatcher::new(false));
    h.service.register(ADDRESS, None, None).await.unwrap();
    h.service.register("c@d.com", None, None).await.unwrap();

    assert_eq!(h.service.clear_all().await.unwrap(), 2);
    assert_eq!(h.service.read(ADDRESS).await.unwrap(), None);
}
