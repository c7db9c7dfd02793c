//! Types for verification service inputs and results

use serde::{Deserialize, Serialize};

/// Everything the dispatcher needs to compose a verification message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationEmail {
    /// Normalized recipient address
    pub address: String,
    /// The OTP
    pub token: String,
    /// Link embedding the OTP
    pub verify_url: String,
    /// How to greet the recipient
    pub display_name: Option<String>,
    /// Application on whose behalf the address is verified
    pub application_name: Option<String>,
}

/// Result of a registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterOutcome {
    /// The address was already verified; nothing was sent or stored
    AlreadyVerified,
    /// A message was dispatched and its token recorded
    Pending,
    /// Dispatch failed or timed out; the record is unchanged
    DispatchFailed,
}
