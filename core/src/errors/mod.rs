//! Domain-specific error types and error handling.

mod types;

pub use types::VerificationError;

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to the verification workflow errors
    #[error(transparent)]
    Verification(#[from] VerificationError),
}

impl DomainError {
    /// The verification error carried by this error, if any
    pub fn as_verification(&self) -> Option<&VerificationError> {
        match self {
            DomainError::Verification(err) => Some(err),
            _ => None,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_error_bridges_into_domain_error() {
        let err: DomainError = VerificationError::TooFrequent { seconds_remaining: 12 }.into();

        assert!(matches!(
            err.as_verification(),
            Some(VerificationError::TooFrequent { seconds_remaining: 12 })
        ));
        assert_eq!(
            err.to_string(),
            "Sending too frequently, retry in 12 seconds"
        );
    }

    #[test]
    fn test_plain_domain_errors_have_no_verification_payload() {
        let err = DomainError::Internal {
            message: "boom".to_string(),
        };
        assert!(err.as_verification().is_none());
        assert_eq!(err.to_string(), "Internal error: boom");
    }
}
