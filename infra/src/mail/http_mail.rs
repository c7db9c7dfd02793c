//! HTTP Mail API Implementation
//!
//! Delivers messages through a transactional mail API that accepts a JSON
//! body and authenticates with an `api-key` header.
//!
//! ## Features
//!
//! - Per-request timeout
//! - Retry with exponential backoff on 429 and 5xx responses
//! - No retry on other client errors
//! - Recipient masking in logs

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use vmail_shared::config::{MailConfig, MAIL_RETRY_BASE_DELAY_MS};
use vmail_shared::utils::mask_email;

use super::mail_service::{MailService, OutgoingEmail};
use crate::InfrastructureError;

/// HTTP mail API configuration
#[derive(Debug, Clone)]
pub struct HttpMailConfig {
    /// Endpoint receiving the JSON payload
    pub api_url: String,
    /// Value of the `api-key` header
    pub api_key: String,
    /// Sender address
    pub from_address: String,
    /// Sender display name
    pub from_name: String,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
    /// Timeout for API requests in seconds
    pub request_timeout_secs: u64,
}

impl HttpMailConfig {
    /// Build from the shared mail configuration
    pub fn from_mail_config(config: &MailConfig) -> Result<Self, InfrastructureError> {
        let api_url = config
            .api_url
            .clone()
            .ok_or_else(|| InfrastructureError::Config("VMAIL_MAIL_API_URL not set".to_string()))?;
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| InfrastructureError::Config("VMAIL_MAIL_API_KEY not set".to_string()))?;

        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(InfrastructureError::Config(
                "VMAIL_MAIL_API_URL must be an http(s) URL".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            api_key,
            from_address: config.from_address.clone(),
            from_name: config.from_name.clone(),
            max_retries: config.max_retries,
            retry_delay_ms: MAIL_RETRY_BASE_DELAY_MS,
            request_timeout_secs: config.request_timeout_secs,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MailAddress<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailBody<'a> {
    sender: MailAddress<'a>,
    to: Vec<MailAddress<'a>>,
    subject: &'a str,
    html_content: &'a str,
    text_content: &'a str,
}

/// HTTP mail service implementation
pub struct HttpMailService {
    client: reqwest::Client,
    config: HttpMailConfig,
}

impl HttpMailService {
    /// Create a new HTTP mail service
    pub fn new(config: HttpMailConfig) -> Result<Self, InfrastructureError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(
            sender = %mask_email(&config.from_address),
            event = "mail_provider_ready",
            "HTTP mail service initialized"
        );

        Ok(Self { client, config })
    }

    fn is_retryable(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    /// Send with retry logic
    async fn send_with_retry(&self, email: &OutgoingEmail) -> Result<String, InfrastructureError> {
        let masked = mask_email(&email.to);
        let body = SendEmailBody {
            sender: MailAddress {
                email: &self.config.from_address,
                name: Some(&self.config.from_name),
            },
            to: vec![MailAddress {
                email: &email.to,
                name: email.to_name.as_deref(),
            }],
            subject: &email.subject,
            html_content: &email.html_body,
            text_content: &email.text_body,
        };

        let total_attempts = self.config.max_retries + 1;
        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        loop {
            attempts += 1;
            debug!(
                attempt = attempts,
                max_attempts = total_attempts,
                email = %masked,
                "Sending mail"
            );

            let result = self
                .client
                .post(&self.config.api_url)
                .header("api-key", &self.config.api_key)
                .header("accept", "application/json")
                .json(&body)
                .send()
                .await;

            let failure = match result {
                Ok(response) if response.status().is_success() => {
                    let message_id = response
                        .json::<serde_json::Value>()
                        .await
                        .ok()
                        .and_then(|v| v.get("messageId").and_then(|id| id.as_str()).map(String::from))
                        .unwrap_or_else(|| format!("http_{}", Uuid::new_v4()));

                    info!(
                        provider = "http",
                        email = %masked,
                        message_id = %message_id,
                        attempts = attempts,
                        event = "mail_sent",
                        "Mail accepted by provider"
                    );
                    return Ok(message_id);
                }
                Ok(response) => {
                    let status = response.status();
                    if !Self::is_retryable(status) {
                        error!(
                            status = status.as_u16(),
                            email = %masked,
                            event = "mail_rejected",
                            "Mail API rejected request"
                        );
                        return Err(InfrastructureError::Mail(format!(
                            "Mail API rejected request with status {}",
                            status.as_u16()
                        )));
                    }
                    InfrastructureError::Mail(format!("Mail API returned status {}", status.as_u16()))
                }
                Err(e) => InfrastructureError::Http(e),
            };

            if attempts >= total_attempts {
                error!(
                    attempts = attempts,
                    email = %masked,
                    error = %failure,
                    event = "mail_failed",
                    "Failed to send mail"
                );
                return Err(failure);
            }

            warn!(
                attempt = attempts,
                error = %failure,
                delay_ms = delay.as_millis() as u64,
                "Mail delivery failed, retrying"
            );
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }
}

#[async_trait]
impl MailService for HttpMailService {
    async fn send_email(&self, email: &OutgoingEmail) -> Result<String, InfrastructureError> {
        self.send_with_retry(email).await
    }

    fn provider_name(&self) -> &str {
        "HTTP"
    }
}
