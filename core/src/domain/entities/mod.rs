//! Domain entities representing core business objects.

pub mod email_verification;

// Re-export commonly used types
pub use email_verification::{
    EmailVerification, VerificationPurpose, DEFAULT_CODE_LENGTH, DEFAULT_EXPIRATION_MINUTES,
};
