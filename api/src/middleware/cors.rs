//! CORS middleware configuration for cross-origin requests.
//!
//! Verification links and client applications may live on any origin, so
//! any origin is allowed for the two methods the API uses.

use actix_cors::Cors;
use actix_web::http::{header, Method};

use super::api_key::API_KEY_HEADER;

/// Creates the CORS middleware instance
pub fn create_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec![Method::GET, Method::POST])
        .allowed_headers(vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
            API_KEY_HEADER,
        ])
        .max_age(3600)
}
