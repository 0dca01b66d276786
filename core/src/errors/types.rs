//! Error taxonomy of the email verification workflow

use thiserror::Error;

/// Errors returned by `generate_and_send` and the admin test email
///
/// Precondition failures (`Disabled`, `NotConfigured`, `TooFrequent`,
/// `DailyLimitExceeded`, `ValidationFailed`) are raised before any record is
/// touched or email sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Email service is not configured, set up the SMTP relay first")]
    NotConfigured,

    #[error("Email verification is disabled")]
    Disabled,

    #[error("Sending too frequently, retry in {seconds_remaining} seconds")]
    TooFrequent { seconds_remaining: u64 },

    #[error("Daily send limit reached ({limit} per day)")]
    DailyLimitExceeded { limit: u32 },

    #[error("Failed to generate verification code: {0}")]
    GenerationFailure(String),

    #[error("Failed to store verification code: {0}")]
    PersistenceFailure(String),

    #[error("Failed to send verification email: {0}")]
    DispatchFailure(String),

    #[error("Invalid {field}: {message}")]
    ValidationFailed { field: String, message: String },
}

impl VerificationError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        VerificationError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the request was refused by a precondition rather than failing midway
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            VerificationError::NotConfigured
                | VerificationError::Disabled
                | VerificationError::TooFrequent { .. }
                | VerificationError::DailyLimitExceeded { .. }
                | VerificationError::ValidationFailed { .. }
        )
    }
}
