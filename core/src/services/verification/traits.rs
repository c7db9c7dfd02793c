//! Traits for mail delivery integration

use async_trait::async_trait;

use super::types::VerificationEmail;

/// Trait for mail service integration
#[async_trait]
pub trait MailDispatcherTrait: Send + Sync {
    /// Deliver a verification message, returning the provider message id
    ///
    /// Ordinary delivery failures are reported as `Err`, never by panicking.
    async fn send_verification_email(&self, email: &VerificationEmail) -> Result<String, String>;
}
