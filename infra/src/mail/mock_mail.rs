//! Mock Mail Service Implementation
//!
//! Accepts every message without sending it. Only a masked summary is
//! logged; message bodies carry the OTP and are kept in memory for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};
use uuid::Uuid;

use vmail_shared::utils::mask_email;

use super::mail_service::{MailService, OutgoingEmail};
use crate::InfrastructureError;

/// Recipients whose last message the mock keeps by default
pub const DEFAULT_OUTBOX_CAPACITY: usize = 1024;

/// Mock mail service for development and testing
#[derive(Clone)]
pub struct MockMailService {
    /// Counter for tracking number of messages sent
    message_count: Arc<AtomicU64>,
    /// Last message delivered to each recipient, oldest recipient first
    outbox: Arc<Mutex<VecDeque<OutgoingEmail>>>,
    /// Recipients kept before the oldest is evicted
    capacity: usize,
    /// Whether to simulate failures (for testing)
    simulate_failure: bool,
}

impl Default for MockMailService {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_OUTBOX_CAPACITY)
    }
}

impl MockMailService {
    /// Name reported by `provider_name`
    pub const PROVIDER_NAME: &'static str = "Mock";

    /// Create a new mock mail service
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that remembers at most `capacity` recipients
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            message_count: Arc::new(AtomicU64::new(0)),
            outbox: Arc::new(Mutex::new(VecDeque::new())),
            capacity: capacity.max(1),
            simulate_failure: false,
        }
    }

    /// Create a mock service that rejects every message
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Get the total number of messages sent
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    /// Reset the message counter
    pub fn reset_counter(&self) {
        self.message_count.store(0, Ordering::SeqCst);
    }

    /// Enable or disable failure simulation
    pub fn set_simulate_failure(&mut self, simulate: bool) {
        self.simulate_failure = simulate;
    }

    /// Last message delivered to `address`
    pub fn last_message_to(&self, address: &str) -> Option<OutgoingEmail> {
        self.outbox().iter().rev().find(|m| m.to == address).cloned()
    }

    /// Number of recipients currently remembered
    pub fn outbox_len(&self) -> usize {
        self.outbox().len()
    }

    fn remember(&self, email: &OutgoingEmail) {
        let mut outbox = self.outbox();
        outbox.retain(|m| m.to != email.to);
        outbox.push_back(email.clone());
        while outbox.len() > self.capacity {
            outbox.pop_front();
        }
    }

    fn outbox(&self) -> MutexGuard<'_, VecDeque<OutgoingEmail>> {
        self.outbox.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MailService for MockMailService {
    async fn send_email(&self, email: &OutgoingEmail) -> Result<String, InfrastructureError> {
        let masked = mask_email(&email.to);

        if self.simulate_failure {
            warn!(
                provider = "mock",
                email = %masked,
                event = "mail_simulated_failure",
                "Mock mail service simulating failure"
            );
            return Err(InfrastructureError::Mail(
                "Simulated mail sending failure".to_string(),
            ));
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.remember(email);

        info!(
            target: "mail_service",
            provider = "mock",
            email = %masked,
            message_id = %message_id,
            message_number = count,
            event = "mail_sent",
            "Mail accepted (mock)"
        );

        Ok(message_id)
    }

    fn provider_name(&self) -> &str {
        Self::PROVIDER_NAME
    }

    async fn is_available(&self) -> bool {
        !self.simulate_failure
    }
}
