//! Business services containing domain logic and use cases.

pub mod clock;
pub mod verification;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use verification::{
    CodeGenerator, KeyDeriver, MailDispatcherTrait, RandomCodeGenerator, RegisterOutcome,
    SequenceCodeGenerator, VerificationEmail, VerificationService, VerificationServiceConfig,
};
