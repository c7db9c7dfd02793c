use actix_web::{web, HttpResponse};

use vmail_core::domain::entities::VerificationState;
use vmail_core::repositories::VerificationRepository;
use vmail_core::services::verification::{MailDispatcherTrait, RegisterOutcome};
use vmail_shared::utils::validate_email;

use super::AppState;
use crate::dto::{EmailAddress, RegisterForm};
use crate::handlers::ApiError;

/// Handler for POST /register
///
/// Sends a verification message with a fresh OTP to the submitted address.
/// Addresses that are already verified are not mailed again.
///
/// # Form fields
///
/// * `email` - address to verify
/// * `name` - optional greeting name
/// * `appname` - optional name of the requesting application
pub async fn register<R, M>(
    state: web::Data<AppState<R, M>>,
    form: web::Form<RegisterForm>,
) -> Result<HttpResponse, ApiError>
where
    R: VerificationRepository + 'static,
    M: MailDispatcherTrait + 'static,
{
    let validation = validate_email(&form.email);
    if !validation.valid {
        return Ok(HttpResponse::Ok().json(EmailAddress::invalid(&form.email, validation.reason)));
    }

    let service = &state.verification_service;
    let outcome = service
        .register(
            &validation.normalized,
            form.name.as_deref(),
            form.appname.as_deref(),
        )
        .await?;

    let (verified, message) = match outcome {
        RegisterOutcome::AlreadyVerified => {
            (VerificationState::Verified, "Address is already verified")
        }
        RegisterOutcome::Pending => (VerificationState::Pending, "Verification request sent"),
        RegisterOutcome::DispatchFailed => {
            // The record is untouched, so report whatever state it already had
            let current = service
                .read(&validation.normalized)
                .await
                .ok()
                .flatten()
                .unwrap_or(VerificationState::Unverified);
            (
                current,
                "There was an error sending the verification request",
            )
        }
    };

    Ok(HttpResponse::Ok().json(EmailAddress::valid(
        &form.email,
        validation.normalized,
        verified,
        message,
    )))
}
