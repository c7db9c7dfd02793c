//! Verification workflow configuration

use serde::{Deserialize, Serialize};

use super::{parse_or, ConfigError, ConfigSource};

/// Placeholder substituted with the OTP in `verify_url`
pub const TOKEN_PLACEHOLDER: &str = "{token}";

/// Longest OTP the service will issue
pub const MAX_OTP_DIGITS: usize = 12;

/// Longest redeemable window for a token: one year
pub const MAX_VERIFY_TIMEOUT_SECONDS: i64 = 365 * 24 * 60 * 60;

/// Settings that drive token issuance and confirmation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Secret mixed into every address key; rotating it orphans existing records
    pub verify_seed: String,

    /// Template for the link embedded in the verification message
    pub verify_url: String,

    /// Seconds a dispatched token stays redeemable
    pub verify_timeout_seconds: i64,

    /// Number of decimal digits in an OTP
    pub otp_digits: usize,

    /// Issuance rounds before a token collision is surfaced
    pub max_token_attempts: u32,

    /// Upper bound on a single dispatch call, in seconds
    pub dispatch_timeout_seconds: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            verify_seed: String::from("replace me with some random seed string"),
            verify_url: String::from("http://localhost:8001/verify/{token}"),
            verify_timeout_seconds: 3600,
            otp_digits: 6,
            max_token_attempts: 3,
            dispatch_timeout_seconds: 15,
        }
    }
}

impl VerificationConfig {
    /// Read `VMAIL_VERIFY_*`, `VMAIL_OTP_DIGITS`, `VMAIL_MAX_TOKEN_ATTEMPTS`
    /// and `VMAIL_DISPATCH_TIMEOUT_SECONDS`
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            verify_seed: source.get("VERIFY_SEED").unwrap_or(defaults.verify_seed),
            verify_url: source.get("VERIFY_URL").unwrap_or(defaults.verify_url),
            verify_timeout_seconds: parse_or(
                source,
                "VERIFY_TIMEOUT_SECONDS",
                defaults.verify_timeout_seconds,
            )?,
            otp_digits: parse_or(source, "OTP_DIGITS", defaults.otp_digits)?,
            max_token_attempts: parse_or(source, "MAX_TOKEN_ATTEMPTS", defaults.max_token_attempts)?,
            dispatch_timeout_seconds: parse_or(
                source,
                "DISPATCH_TIMEOUT_SECONDS",
                defaults.dispatch_timeout_seconds,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the engine relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.verify_seed.is_empty() {
            return Err(invalid("VERIFY_SEED", "seed must not be empty"));
        }
        if !self.verify_url.contains(TOKEN_PLACEHOLDER) {
            return Err(invalid("VERIFY_URL", "template must contain {token}"));
        }
        if self.otp_digits == 0 || self.otp_digits > MAX_OTP_DIGITS {
            return Err(invalid(
                "OTP_DIGITS",
                &format!("must be between 1 and {}", MAX_OTP_DIGITS),
            ));
        }
        if !(0..=MAX_VERIFY_TIMEOUT_SECONDS).contains(&self.verify_timeout_seconds) {
            return Err(invalid(
                "VERIFY_TIMEOUT_SECONDS",
                &format!("must be between 0 and {}", MAX_VERIFY_TIMEOUT_SECONDS),
            ));
        }
        if self.max_token_attempts == 0 {
            return Err(invalid("MAX_TOKEN_ATTEMPTS", "must be at least 1"));
        }
        Ok(())
    }

    /// Substitute a token into the verify URL template
    pub fn verify_url_for(&self, token: &str) -> String {
        self.verify_url.replace(TOKEN_PLACEHOLDER, token)
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        message: message.to_string(),
    }
}
