//! Common utility functions

pub mod email;

pub use email::{mask_email, normalize_email, validate_email, EmailValidation};
