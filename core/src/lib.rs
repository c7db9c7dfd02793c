//! # vmail Core
//!
//! Core business logic for the email verification service.
//! This crate contains the verification record entity, the derived state
//! machine, the record store contract with an in-memory implementation, and
//! the verification engine together with its collaborator traits.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::{InMemoryVerificationRepository, VerificationRepository};
pub use services::{
    Clock, CodeGenerator, KeyDeriver, MailDispatcherTrait, ManualClock, RandomCodeGenerator,
    RegisterOutcome, SequenceCodeGenerator, SystemClock, VerificationEmail, VerificationService,
    VerificationServiceConfig,
};
