//! # vmail API
//!
//! HTTP surface of the email verification service.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::create_app;
pub use routes::email::AppState;
