//! Mail Service Interface
//!
//! Defines the trait for mail providers that deliver verification
//! messages, plus the provider-neutral message they deliver.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::InfrastructureError;

/// A fully rendered message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingEmail {
    /// Recipient address
    pub to: String,
    /// Recipient display name
    pub to_name: Option<String>,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub text_body: String,
    /// HTML body
    pub html_body: String,
}

/// Mail service trait for sending messages
///
/// Implementations include:
/// - HTTP mail API (transactional email providers)
/// - Mock implementation for development
#[async_trait]
pub trait MailService: Send + Sync {
    /// Deliver a message
    ///
    /// # Returns
    ///
    /// * `Ok(message_id)` - Provider identifier for the sent message
    /// * `Err(InfrastructureError)` - If delivery fails
    async fn send_email(&self, email: &OutgoingEmail) -> Result<String, InfrastructureError>;

    /// Get the service provider name (e.g., "HTTP", "Mock")
    fn provider_name(&self) -> &str;

    /// Check if the service is available
    ///
    /// Default implementation always returns true.
    async fn is_available(&self) -> bool {
        true
    }
}
