use actix_web::{web, HttpResponse};

use vmail_core::domain::entities::VerificationState;
use vmail_core::repositories::VerificationRepository;
use vmail_core::services::verification::MailDispatcherTrait;
use vmail_shared::utils::validate_email;

use super::AppState;
use crate::dto::{EmailAddress, EmailQuery};
use crate::handlers::ApiError;

/// Handler for GET /verified
pub async fn verified<R, M>(
    state: web::Data<AppState<R, M>>,
    query: web::Query<EmailQuery>,
) -> Result<HttpResponse, ApiError>
where
    R: VerificationRepository + 'static,
    M: MailDispatcherTrait + 'static,
{
    let validation = validate_email(&query.email);
    if !validation.valid {
        return Ok(HttpResponse::Ok().json(EmailAddress::invalid(&query.email, validation.reason)));
    }

    let body = match state.verification_service.read(&validation.normalized).await? {
        Some(current) => EmailAddress::valid(&query.email, validation.normalized, current, "OK"),
        None => EmailAddress::valid(
            &query.email,
            validation.normalized,
            VerificationState::Unverified,
            "Address is valid but not verified",
        ),
    };

    Ok(HttpResponse::Ok().json(body))
}
