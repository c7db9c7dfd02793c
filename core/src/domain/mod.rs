//! Domain layer containing the verification record and its derived state.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;
