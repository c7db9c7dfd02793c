//! Application factory
//!
//! Builds the Actix-web application around a verification service. The
//! factory is generic over the record store and the mail dispatcher so the
//! same routes serve MySQL, the in-memory store and test doubles.

use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use vmail_core::repositories::VerificationRepository;
use vmail_core::services::verification::MailDispatcherTrait;
use vmail_shared::errors::{error_codes, ErrorResponse};

use crate::middleware::{create_cors, ApiKeyAuth};
use crate::routes::email::{register, valid, verified, verify, AppState};
use crate::routes::health::health_check;

/// Create and configure the application with all dependencies
pub fn create_app<R, M>(
    app_state: web::Data<AppState<R, M>>,
    api_keys: ApiKeyAuth,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    R: VerificationRepository + 'static,
    M: MailDispatcherTrait + 'static,
{
    App::new()
        .app_data(app_state)
        // Middleware order: the last wrap runs first
        .wrap(api_keys)
        .wrap(create_cors())
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .route("/valid", web::get().to(valid::<R, M>))
        .route("/register", web::post().to(register::<R, M>))
        .route("/verified", web::get().to(verified::<R, M>))
        .route("/verify/{token}", web::get().to(verify::<R, M>))
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
