//! Email address normalization, validation and masking

use serde::Serialize;
use validator::ValidateEmail;

/// Longest address accepted (RFC 5321 path limit minus the angle brackets)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Outcome of checking a raw address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailValidation {
    /// Normalized form; present even when invalid so callers can echo it back
    pub normalized: String,
    pub valid: bool,
    /// Human-readable reason when `valid` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl EmailValidation {
    fn invalid(normalized: String, reason: impl Into<String>) -> Self {
        Self {
            normalized,
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Trim surrounding whitespace and lowercase the domain part
///
/// The local part keeps its case; only the domain is case-insensitive.
pub fn normalize_email(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_ascii_lowercase()),
        None => trimmed.to_string(),
    }
}

/// Normalize and syntactically validate an address
pub fn validate_email(raw: &str) -> EmailValidation {
    let normalized = normalize_email(raw);

    if normalized.is_empty() {
        return EmailValidation::invalid(normalized, "The email address is empty.");
    }
    if normalized.len() > MAX_EMAIL_LENGTH {
        return EmailValidation::invalid(normalized, "The email address is too long.");
    }

    let Some((local, domain)) = normalized.rsplit_once('@') else {
        return EmailValidation::invalid(
            normalized,
            "The email address is not valid. It must have exactly one @-sign.",
        );
    };
    if local.is_empty() {
        return EmailValidation::invalid(
            normalized,
            "There must be something before the @-sign.",
        );
    }
    if domain.is_empty() {
        return EmailValidation::invalid(normalized, "There must be something after the @-sign.");
    }
    if !domain.contains('.') {
        return EmailValidation::invalid(
            normalized,
            "The part after the @-sign is not valid. It should have a period.",
        );
    }
    if !normalized.validate_email() {
        return EmailValidation::invalid(normalized, "The email address is not valid.");
    }

    EmailValidation {
        normalized,
        valid: true,
        reason: None,
    }
}

/// Mask an address for logging: `alice@example.com` -> `a***@example.com`
pub fn mask_email(address: &str) -> String {
    match address.rsplit_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}
