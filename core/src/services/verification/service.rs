//! Main verification service implementation

use chrono::Duration;
use std::sync::Arc;

use vmail_shared::utils::mask_email;

use crate::domain::entities::{VerificationRecord, VerificationState};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::VerificationRepository;
use crate::services::clock::{Clock, SystemClock};

use super::code::{CodeGenerator, RandomCodeGenerator};
use super::config::VerificationServiceConfig;
use super::key::KeyDeriver;
use super::traits::MailDispatcherTrait;
use super::types::{RegisterOutcome, VerificationEmail};

/// Verification engine driving every state transition of an address
///
/// Holds no record state of its own: every call reads through the
/// repository, and every mutation is a single atomic repository operation.
pub struct VerificationService<R: VerificationRepository, M: MailDispatcherTrait> {
    /// Record store
    repository: Arc<R>,
    /// Mail collaborator
    mailer: Arc<M>,
    /// Time source
    clock: Arc<dyn Clock>,
    /// OTP source
    codes: Arc<dyn CodeGenerator>,
    /// Address key derivation
    keys: KeyDeriver,
    /// Service configuration
    config: VerificationServiceConfig,
}

impl<R: VerificationRepository, M: MailDispatcherTrait> VerificationService<R, M> {
    /// Create a new verification service using the system clock and OS RNG
    ///
    /// # Arguments
    ///
    /// * `repository` - Record store implementation
    /// * `mailer` - Mail dispatcher implementation
    /// * `config` - Service configuration
    pub fn new(repository: Arc<R>, mailer: Arc<M>, config: VerificationServiceConfig) -> Self {
        Self {
            repository,
            mailer,
            clock: Arc::new(SystemClock),
            codes: Arc::new(RandomCodeGenerator),
            keys: KeyDeriver::new(config.seed.clone()),
            config,
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the OTP source
    pub fn with_code_generator(mut self, codes: Arc<dyn CodeGenerator>) -> Self {
        self.codes = codes;
        self
    }

    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    /// Derive the state of a record (absent records are `Unverified`)
    pub fn derive_state(record: Option<&VerificationRecord>) -> VerificationState {
        VerificationState::derive(record)
    }

    /// Record key for a normalized address
    pub fn address_key(&self, address: &str) -> String {
        self.keys.derive(address)
    }

    /// Current state of an address, or `None` if it was never registered
    pub async fn read(&self, address: &str) -> DomainResult<Option<VerificationState>> {
        let key = self.keys.derive(address);
        let record = self.repository.get_by_key(&key).await?;
        Ok(record.as_ref().map(VerificationRecord::state))
    }

    /// Register an address and dispatch a verification message
    ///
    /// This method:
    /// 1. Ensures a record exists for the address
    /// 2. Returns `AlreadyVerified` without side effects for verified addresses
    /// 3. Generates an OTP that no record currently holds
    /// 4. Dispatches the message, bounded by the dispatch timeout
    /// 5. Stores the token, retrying with a fresh OTP if another record took it
    ///
    /// # Errors
    ///
    /// * `DomainError::Conflict` - Every issuance round collided
    /// * Any store error from the repository
    pub async fn register(
        &self,
        address: &str,
        display_name: Option<&str>,
        application_name: Option<&str>,
    ) -> DomainResult<RegisterOutcome> {
        let key = self.keys.derive(address);
        let masked = mask_email(address);

        self.repository
            .create_or_ignore(&key, self.clock.now())
            .await?;
        let record = self.repository.get_by_key(&key).await?;

        if Self::derive_state(record.as_ref()).is_verified() {
            tracing::info!(
                email = %masked,
                event = "register_already_verified",
                "Address already verified, no message sent"
            );
            return Ok(RegisterOutcome::AlreadyVerified);
        }

        for attempt in 1..=self.config.max_token_attempts {
            let token = self.codes.generate(self.config.otp_digits);

            if self.repository.token_exists(&token).await? {
                tracing::debug!(
                    email = %masked,
                    attempt = attempt,
                    event = "token_collision",
                    "Generated token already outstanding, regenerating"
                );
                continue;
            }

            let email = VerificationEmail {
                address: address.to_string(),
                verify_url: self.config.verify_url_for(&token),
                token: token.clone(),
                display_name: display_name.map(str::to_string),
                application_name: application_name.map(str::to_string),
            };

            let message_id = match self.dispatch(&email).await {
                Ok(message_id) => message_id,
                Err(reason) => {
                    tracing::warn!(
                        email = %masked,
                        error = %reason,
                        event = "verification_dispatch_failed",
                        "Failed to dispatch verification message"
                    );
                    return Ok(RegisterOutcome::DispatchFailed);
                }
            };

            match self
                .repository
                .set_token(&key, &token, self.clock.now())
                .await
            {
                Ok(()) => {
                    tracing::info!(
                        email = %masked,
                        message_id = %message_id,
                        attempt = attempt,
                        event = "verification_requested",
                        "Verification message sent"
                    );
                    return Ok(RegisterOutcome::Pending);
                }
                Err(e) if e.is_conflict() => {
                    tracing::warn!(
                        email = %masked,
                        attempt = attempt,
                        event = "token_collision",
                        "Token taken by another record after dispatch, reissuing"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        email = %masked,
                        error = %e,
                        event = "token_store_failed",
                        "Failed to record dispatched token"
                    );
                    return Err(e);
                }
            }
        }

        tracing::error!(
            email = %masked,
            attempts = self.config.max_token_attempts,
            event = "token_issuance_exhausted",
            "Could not issue a unique token"
        );
        Err(DomainError::Conflict {
            message: format!(
                "Could not issue a unique token after {} attempts",
                self.config.max_token_attempts
            ),
        })
    }

    /// Redeem a token
    ///
    /// Unknown tokens yield `Unverified`. A token older than
    /// `expiration_seconds` yields `Expired` and is left in place.
    pub async fn confirm(
        &self,
        token: &str,
        expiration_seconds: i64,
    ) -> DomainResult<VerificationState> {
        let Some(record) = self.repository.get_by_token(token).await? else {
            return Ok(VerificationState::Unverified);
        };
        let Some(requested_at) = record.requested_at else {
            return Ok(VerificationState::Unverified);
        };

        let now = self.clock.now();
        let elapsed = now - requested_at;
        // A window too large for chrono never elapses
        let expired =
            Duration::try_seconds(expiration_seconds).is_some_and(|window| elapsed > window);
        if expired {
            tracing::info!(
                elapsed_seconds = elapsed.num_seconds(),
                expiration_seconds = expiration_seconds,
                event = "token_expired",
                "Verification token presented after expiry"
            );
            return Ok(VerificationState::Expired);
        }

        match self.repository.mark_verified(token, now).await {
            Ok(()) => {
                tracing::info!(event = "address_verified", "Verification token redeemed");
                Ok(VerificationState::Verified)
            }
            // Redeemed or superseded between the lookup and the update
            Err(e) if e.is_not_found() => Ok(VerificationState::Unverified),
            Err(e) => Err(e),
        }
    }

    /// Redeem a token with the configured expiration
    pub async fn confirm_with_default(&self, token: &str) -> DomainResult<VerificationState> {
        self.confirm(token, self.config.expiration_seconds).await
    }

    /// Whether any record currently holds the token
    pub async fn token_exists(&self, token: &str) -> DomainResult<bool> {
        self.repository.token_exists(token).await
    }

    /// Delete every record
    pub async fn clear_all(&self) -> DomainResult<u64> {
        let removed = self.repository.clear_all().await?;
        tracing::warn!(
            removed = removed,
            event = "records_cleared",
            "Deleted all verification records"
        );
        Ok(removed)
    }

    async fn dispatch(&self, email: &VerificationEmail) -> Result<String, String> {
        let timeout = self.config.dispatch_timeout;
        match tokio::time::timeout(timeout, self.mailer.send_verification_email(email)).await {
            Ok(result) => result,
            Err(_) => Err(format!("dispatch timed out after {}s", timeout.as_secs_f32())),
        }
    }
}
