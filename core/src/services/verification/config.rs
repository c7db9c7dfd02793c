//! Configuration for the verification service

use std::time::Duration;

use vmail_shared::config::VerificationConfig;

/// Default window in which a dispatched token can be redeemed
pub const DEFAULT_EXPIRATION_SECONDS: i64 = 3600;

/// Configuration for the verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Secret mixed into every address key
    pub seed: String,
    /// Number of digits in an OTP
    pub otp_digits: usize,
    /// Link template; `{token}` is replaced with the OTP
    pub verify_url_template: String,
    /// Expiration used by `confirm_with_default`
    pub expiration_seconds: i64,
    /// Issuance rounds before a collision is surfaced
    pub max_token_attempts: u32,
    /// Upper bound on one dispatcher call
    pub dispatch_timeout: Duration,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self::from(&VerificationConfig::default())
    }
}

impl From<&VerificationConfig> for VerificationServiceConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            seed: config.verify_seed.clone(),
            otp_digits: config.otp_digits,
            verify_url_template: config.verify_url.clone(),
            expiration_seconds: config.verify_timeout_seconds,
            max_token_attempts: config.max_token_attempts.max(1),
            dispatch_timeout: Duration::from_secs(config.dispatch_timeout_seconds),
        }
    }
}

impl VerificationServiceConfig {
    /// Build the verification link for a token
    pub fn verify_url_for(&self, token: &str) -> String {
        self.verify_url_template
            .replace(vmail_shared::config::TOKEN_PLACEHOLDER, token)
    }
}
