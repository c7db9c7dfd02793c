//! Mail Service Trait Adapter
//!
//! Implements the core `MailDispatcherTrait` over any infrastructure
//! `MailService`, rendering the message on the way through.

use async_trait::async_trait;

use vmail_core::services::verification::{MailDispatcherTrait, VerificationEmail};
use vmail_shared::config::MailConfig;

use super::mail_service::MailService;
use super::mock_mail::MockMailService;
use super::template::render_verification_email;
use super::create_mail_service;

/// Adapter that implements the core MailDispatcherTrait
pub struct MailServiceAdapter {
    inner: Box<dyn MailService>,
    subject: String,
}

impl MailServiceAdapter {
    /// Wrap a provider, sending every message with `subject`
    pub fn new(inner: Box<dyn MailService>, subject: impl Into<String>) -> Self {
        Self {
            inner,
            subject: subject.into(),
        }
    }

    /// Build the configured provider and wrap it
    pub fn from_config(config: &MailConfig) -> Self {
        Self::new(create_mail_service(config), config.subject.clone())
    }

    /// Name of the wrapped provider
    pub fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    /// Whether messages actually leave the process
    pub fn delivers_mail(&self) -> bool {
        self.provider_name() != MockMailService::PROVIDER_NAME
    }
}

#[async_trait]
impl MailDispatcherTrait for MailServiceAdapter {
    async fn send_verification_email(&self, email: &VerificationEmail) -> Result<String, String> {
        let message = render_verification_email(email, &self.subject);
        self.inner
            .send_email(&message)
            .await
            .map_err(|e| e.to_string())
    }
}
