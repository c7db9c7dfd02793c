//! Route handlers

pub mod email;
pub mod health;
