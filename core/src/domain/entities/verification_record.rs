//! Verification record entity and the state derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Verification state of an address, always computed from record timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationState {
    /// Known but never requested, or never confirmed
    Unverified,
    /// A token has been dispatched and not yet redeemed
    Pending,
    /// The most recent request was redeemed
    Verified,
    /// The last confirmation predates the current request
    Expired,
}

impl VerificationState {
    /// Derive state from a record; an absent record is `Unverified`
    ///
    /// | condition                          | state      |
    /// |------------------------------------|------------|
    /// | no record, or no `requested_at`    | unverified |
    /// | no `verified_at`                   | unverified |
    /// | `verified_at` < `requested_at`     | expired    |
    /// | `token` still present              | pending    |
    /// | otherwise                          | verified   |
    pub fn derive(record: Option<&VerificationRecord>) -> Self {
        let Some(record) = record else {
            return VerificationState::Unverified;
        };
        let Some(requested_at) = record.requested_at else {
            return VerificationState::Unverified;
        };
        let Some(verified_at) = record.verified_at else {
            return VerificationState::Unverified;
        };

        if verified_at < requested_at {
            VerificationState::Expired
        } else if record.token.is_some() {
            VerificationState::Pending
        } else {
            VerificationState::Verified
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationState::Verified)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationState::Unverified => "unverified",
            VerificationState::Pending => "pending",
            VerificationState::Verified => "verified",
            VerificationState::Expired => "expired",
        }
    }
}

impl std::fmt::Display for VerificationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record per distinct address, keyed by the derived address key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Irreversible key derived from the normalized address and seed
    pub key: String,

    /// Outstanding OTP, present only while a request is outstanding
    pub token: Option<String>,

    /// Set once at creation
    pub created_at: DateTime<Utc>,

    /// Most recent dispatch
    pub requested_at: Option<DateTime<Utc>>,

    /// Most recent successful confirmation
    pub verified_at: Option<DateTime<Utc>>,
}

impl VerificationRecord {
    /// Create a fresh record with only `created_at` populated
    pub fn new(key: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            token: None,
            created_at,
            requested_at: None,
            verified_at: None,
        }
    }

    /// Derived verification state
    pub fn state(&self) -> VerificationState {
        VerificationState::derive(Some(self))
    }

    /// Attach a freshly dispatched token
    pub fn issue_token(&mut self, token: impl Into<String>, requested_at: DateTime<Utc>) {
        self.token = Some(token.into());
        self.requested_at = Some(requested_at);
    }

    /// Record a successful confirmation and release the token
    pub fn confirm(&mut self, verified_at: DateTime<Utc>) {
        self.verified_at = Some(verified_at);
        self.token = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_absent_record_is_unverified() {
        assert_eq!(VerificationState::derive(None), VerificationState::Unverified);
    }

    #[test]
    fn test_new_record_is_unverified() {
        let record = VerificationRecord::new("k", t0());
        assert_eq!(record.state(), VerificationState::Unverified);
    }

    #[test]
    fn test_first_request_without_confirmation_is_unverified() {
        let mut record = VerificationRecord::new("k", t0());
        record.issue_token("123456", t0());
        assert_eq!(record.state(), VerificationState::Unverified);
    }

    #[test]
    fn test_confirmed_record_is_verified() {
        let mut record = VerificationRecord::new("k", t0());
        record.issue_token("123456", t0());
        record.confirm(t0() + Duration::seconds(10));
        assert_eq!(record.state(), VerificationState::Verified);
        assert!(record.token.is_none());
        assert!(record.state().is_verified());
    }

    #[test]
    fn test_new_request_after_confirmation_is_expired() {
        let mut record = VerificationRecord::new("k", t0());
        record.issue_token("123456", t0());
        record.confirm(t0() + Duration::seconds(10));
        record.issue_token("654321", t0() + Duration::hours(2));
        assert_eq!(record.state(), VerificationState::Expired);
    }

    #[test]
    fn test_token_present_with_later_confirmation_is_pending() {
        let record = VerificationRecord {
            key: "k".to_string(),
            token: Some("111111".to_string()),
            created_at: t0(),
            requested_at: Some(t0()),
            verified_at: Some(t0() + Duration::seconds(1)),
        };
        assert_eq!(record.state(), VerificationState::Pending);
    }

    #[test]
    fn test_equal_timestamps_count_as_verified() {
        let mut record = VerificationRecord::new("k", t0());
        record.issue_token("123456", t0());
        record.confirm(t0());
        assert_eq!(record.state(), VerificationState::Verified);
    }

    #[test]
    fn test_state_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&VerificationState::Expired).unwrap(),
            "\"expired\""
        );
        assert_eq!(VerificationState::Pending.to_string(), "pending");
    }
}
