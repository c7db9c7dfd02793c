//! Verification service module for email ownership checks
//!
//! This module provides the verification workflow:
//! - Address key derivation from a secret seed
//! - OTP generation and bounded retry on token collisions
//! - Dispatch through a pluggable mail collaborator with a timeout
//! - Confirmation with expiry checks against an injectable clock

mod code;
mod config;
mod key;
mod service;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use code::{CodeGenerator, RandomCodeGenerator, SequenceCodeGenerator};
pub use config::{VerificationServiceConfig, DEFAULT_EXPIRATION_SECONDS};
pub use key::KeyDeriver;
pub use service::VerificationService;
pub use traits::MailDispatcherTrait;
pub use types::{RegisterOutcome, VerificationEmail};
