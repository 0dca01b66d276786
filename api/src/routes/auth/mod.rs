//! Email verification route handlers
//!
//! - `POST /api/v1/auth/email/send-code`
//! - `POST /api/v1/auth/email/verify-code`
//! - `GET /api/v1/auth/email/status`

pub mod send_code;
pub mod status;
pub mod verify_code;

use mc_core::domain::VerificationPurpose;

use crate::handlers::ApiError;

/// Parse the `purpose` field of a request body
pub(crate) fn parse_purpose(raw: &str) -> Result<VerificationPurpose, ApiError> {
    raw.trim()
        .parse::<VerificationPurpose>()
        .map_err(|_| ApiError::invalid_field("purpose", "purpose must be 'register' or 'reset_password'"))
}
