//! Outbound mail configuration

use serde::{Deserialize, Serialize};

use super::{parse_or, ConfigError, ConfigSource};

/// First retry delay of the HTTP provider; each later retry doubles it
pub const MAIL_RETRY_BASE_DELAY_MS: u64 = 500;

/// Mail provider selection and sender identity
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    /// Provider name (`mock` or `http`)
    pub provider: String,

    /// Endpoint of the HTTP mail API
    pub api_url: Option<String>,

    /// Key sent in the `api-key` header
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Sender address
    pub from_address: String,

    /// Sender display name
    pub from_name: String,

    /// Subject line of verification messages
    pub subject: String,

    /// Retries on 429 and 5xx responses
    pub max_retries: u32,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: String::from("mock"),
            api_url: None,
            api_key: None,
            from_address: String::from("noreply@example.com"),
            from_name: String::from("Mail Verification"),
            subject: String::from("Verify your email address"),
            max_retries: 2,
            request_timeout_secs: 4,
        }
    }
}

impl MailConfig {
    /// Read `VMAIL_MAIL_*` variables
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            provider: source
                .get("MAIL_PROVIDER")
                .map(|p| p.to_lowercase())
                .unwrap_or(defaults.provider),
            api_url: source.get("MAIL_API_URL").filter(|v| !v.is_empty()),
            api_key: source.get("MAIL_API_KEY").filter(|v| !v.is_empty()),
            from_address: source.get("MAIL_FROM").unwrap_or(defaults.from_address),
            from_name: source.get("MAIL_FROM_NAME").unwrap_or(defaults.from_name),
            subject: source.get("MAIL_SUBJECT").unwrap_or(defaults.subject),
            max_retries: parse_or(source, "MAIL_MAX_RETRIES", defaults.max_retries)?,
            request_timeout_secs: parse_or(
                source,
                "MAIL_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
        })
    }

    /// Whether the HTTP provider has everything it needs
    pub fn has_http_credentials(&self) -> bool {
        self.api_url.is_some() && self.api_key.is_some()
    }

    /// Longest an HTTP send can take: every attempt timing out plus all backoff
    pub fn worst_case_send_millis(&self) -> u64 {
        let attempts = u64::from(self.max_retries) + 1;
        let requests = attempts.saturating_mul(self.request_timeout_secs.saturating_mul(1000));
        let backoff = 1u64
            .checked_shl(self.max_retries)
            .unwrap_or(u64::MAX)
            .saturating_sub(1)
            .saturating_mul(MAIL_RETRY_BASE_DELAY_MS);
        requests.saturating_add(backoff)
    }
}
