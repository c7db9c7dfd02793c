//! Email verification route handlers
//!
//! - `GET /valid` - syntax check plus stored state
//! - `POST /register` - send a verification message
//! - `GET /verified` - stored state of an address
//! - `GET /verify/{token}` - redeem an OTP

pub mod register;
pub mod valid;
pub mod verified;
pub mod verify;

pub use register::register;
pub use valid::valid;
pub use verified::verified;
pub use verify::verify;

use std::sync::Arc;

use vmail_core::repositories::VerificationRepository;
use vmail_core::services::verification::{MailDispatcherTrait, VerificationService};

/// Application state that holds shared services
pub struct AppState<R, M>
where
    R: VerificationRepository,
    M: MailDispatcherTrait,
{
    pub verification_service: Arc<VerificationService<R, M>>,
}

impl<R, M> AppState<R, M>
where
    R: VerificationRepository,
    M: MailDispatcherTrait,
{
    pub fn new(verification_service: Arc<VerificationService<R, M>>) -> Self {
        Self {
            verification_service,
        }
    }
}
