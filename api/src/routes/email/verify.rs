use actix_web::{web, HttpResponse};

use vmail_core::repositories::VerificationRepository;
use vmail_core::services::verification::MailDispatcherTrait;
use vmail_shared::errors::{error_codes, ErrorResponse};

use super::AppState;
use crate::dto::VerifiedResponse;
use crate::handlers::ApiError;

/// Handler for GET /verify/{token}
///
/// # Responses
///
/// * `200` - `VerifiedResponse` with the state after confirmation
/// * `400` - token is not exactly `otp_digits` decimal digits
/// * `404` - no record holds the token
pub async fn verify<R, M>(
    state: web::Data<AppState<R, M>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError>
where
    R: VerificationRepository + 'static,
    M: MailDispatcherTrait + 'static,
{
    let token = path.into_inner();
    let service = &state.verification_service;
    let digits = service.config().otp_digits;

    if token.len() != digits || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(HttpResponse::BadRequest().json(
            ErrorResponse::new(
                error_codes::TOKEN_INVALID,
                format!("Token must be exactly {} digits", digits),
            )
            .add_detail("expected_length", digits),
        ));
    }

    if !service.token_exists(&token).await? {
        return Ok(HttpResponse::NotFound().json(ErrorResponse::new(
            error_codes::TOKEN_NOT_FOUND,
            "Token not found",
        )));
    }

    let verification_state = service.confirm_with_default(&token).await?;
    Ok(HttpResponse::Ok().json(VerifiedResponse::from(verification_state)))
}
