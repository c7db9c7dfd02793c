//! Mapping of domain errors to HTTP responses

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

use vmail_core::errors::DomainError;
use vmail_shared::errors::{error_codes, ErrorResponse};

/// Domain error surfaced through an HTTP handler
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self(error)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ApiError {
    fn error_code(&self) -> &'static str {
        match self.0 {
            DomainError::Validation { .. } => error_codes::VALIDATION_ERROR,
            DomainError::NotFound { .. } => error_codes::NOT_FOUND,
            DomainError::Conflict { .. } => error_codes::CONFLICT,
            DomainError::DispatchFailure { .. } => error_codes::MAIL_ERROR,
            DomainError::StoreUnavailable { .. } => error_codes::DATABASE_ERROR,
            DomainError::Internal { .. } => error_codes::INTERNAL_ERROR,
        }
    }

    /// Message safe to show to API clients
    fn public_message(&self) -> String {
        match &self.0 {
            DomainError::Validation { message } => message.clone(),
            DomainError::NotFound { resource } => format!("{} not found", resource),
            DomainError::Conflict { .. } => {
                "Could not issue a unique verification code, please retry".to_string()
            }
            DomainError::DispatchFailure { .. } => {
                "There was an error sending the verification request".to_string()
            }
            DomainError::StoreUnavailable { .. } => {
                "ERROR: Could not connect to validation database.".to_string()
            }
            DomainError::Internal { .. } => "An internal error occurred".to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Conflict { .. } => StatusCode::CONFLICT,
            DomainError::DispatchFailure { .. } | DomainError::StoreUnavailable { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            DomainError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, status = status.as_u16(), "Request failed");
        } else {
            tracing::warn!(error = %self.0, status = status.as_u16(), "Request rejected");
        }

        HttpResponse::build(status).json(ErrorResponse::new(self.error_code(), self.public_message()))
    }
}
