//! Mail Module
//!
//! Delivers verification messages. It includes a provider trait, an HTTP
//! mail API implementation, a mock for development, and the adapter the
//! verification engine talks to.
//!
//! ## Features
//!
//! - **Mail Service Trait**: Common interface for all providers
//! - **Mock Implementation**: In-memory outbox for development
//! - **HTTP Support**: JSON mail API with retry
//! - **Security**: Address masking in logs, OTPs never logged

pub mod adapter;
pub mod http_mail;
pub mod mail_service;
pub mod mock_mail;
pub mod template;

// Re-export commonly used types
pub use adapter::MailServiceAdapter;
pub use http_mail::{HttpMailConfig, HttpMailService};
pub use mail_service::{MailService, OutgoingEmail};
pub use mock_mail::MockMailService;
pub use template::render_verification_email;

use vmail_shared::config::MailConfig;

#[cfg(test)]
mod tests;

/// Create a mail service based on configuration
///
/// Unknown or misconfigured providers fall back to the mock.
pub fn create_mail_service(config: &MailConfig) -> Box<dyn MailService> {
    match config.provider.as_str() {
        "mock" => Box::new(MockMailService::new()),
        "http" => match HttpMailConfig::from_mail_config(config).and_then(HttpMailService::new) {
            Ok(service) => Box::new(service),
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize HTTP mail service");
                tracing::warn!("Falling back to mock mail service");
                Box::new(MockMailService::new())
            }
        },
        _ => {
            tracing::warn!(
                "Unknown mail provider '{}', using mock implementation",
                config.provider
            );
            Box::new(MockMailService::new())
        }
    }
}
