//! Request and response types for the email verification endpoints

use serde::{Deserialize, Serialize};

use vmail_core::domain::entities::VerificationState;

/// Query string of `GET /valid` and `GET /verified`
#[derive(Debug, Clone, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

/// Form body of `POST /register`
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    /// Address to verify
    pub email: String,
    /// How the recipient is greeted
    pub name: Option<String>,
    /// Application requesting the verification
    pub appname: Option<String>,
}

/// Address check result shared by `/valid`, `/register` and `/verified`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// Address exactly as submitted
    pub address: String,
    pub normalized: Option<String>,
    pub verified: VerificationState,
    pub valid: bool,
    pub message: Option<String>,
}

impl EmailAddress {
    /// Result for an address that failed syntactic validation
    pub fn invalid(address: impl Into<String>, reason: Option<String>) -> Self {
        Self {
            address: address.into(),
            normalized: None,
            verified: VerificationState::Unverified,
            valid: false,
            message: reason,
        }
    }

    /// Result for a syntactically valid address
    pub fn valid(
        address: impl Into<String>,
        normalized: impl Into<String>,
        verified: VerificationState,
        message: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            normalized: Some(normalized.into()),
            verified,
            valid: true,
            message: Some(message.into()),
        }
    }
}

/// Result of `GET /verify/{token}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedResponse {
    pub verified: bool,
    pub state: VerificationState,
}

impl From<VerificationState> for VerifiedResponse {
    fn from(state: VerificationState) -> Self {
        Self {
            verified: state.is_verified(),
            state,
        }
    }
}
