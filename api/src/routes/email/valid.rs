use actix_web::{web, HttpResponse};

use vmail_core::domain::entities::VerificationState;
use vmail_core::repositories::VerificationRepository;
use vmail_core::services::verification::MailDispatcherTrait;
use vmail_shared::utils::{mask_email, validate_email};

use super::AppState;
use crate::dto::{EmailAddress, EmailQuery};

/// Handler for GET /valid
///
/// Checks the syntax of an address and, when it is valid, reports what the
/// record store knows about it. A store failure does not fail the request;
/// it is reported in `message`.
pub async fn valid<R, M>(
    state: web::Data<AppState<R, M>>,
    query: web::Query<EmailQuery>,
) -> HttpResponse
where
    R: VerificationRepository + 'static,
    M: MailDispatcherTrait + 'static,
{
    let validation = validate_email(&query.email);
    if !validation.valid {
        return HttpResponse::Ok().json(EmailAddress::invalid(&query.email, validation.reason));
    }

    let (verified, message) = match state.verification_service.read(&validation.normalized).await {
        Ok(Some(VerificationState::Verified)) => {
            (VerificationState::Verified, "Address is valid and verified.")
        }
        Ok(Some(other)) => (other, "Address is valid but not verified"),
        Ok(None) => (VerificationState::Unverified, "Address is valid but not verified"),
        Err(e) => {
            tracing::error!(
                email = %mask_email(&validation.normalized),
                error = %e,
                event = "valid_lookup_failed",
                "Could not read verification state"
            );
            (
                VerificationState::Unverified,
                "ERROR: Could not connect to validation database.",
            )
        }
    };

    HttpResponse::Ok().json(EmailAddress::valid(
        &query.email,
        validation.normalized,
        verified,
        message,
    ))
}
