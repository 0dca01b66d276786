use serde::{Deserialize, Serialize};
use validator::Validate;

use mc_core::services::{SendCodeResult, VerificationStatus};

/// Body of `POST /api/v1/auth/email/send-code`
///
/// Email format is checked after normalization by the service, so only the
/// length is validated here.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendCodeRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    /// `register` or `reset_password`
    #[validate(length(min = 1, max = 20))]
    pub purpose: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyCodeRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 16))]
    pub code: String,
    #[validate(length(min = 1, max = 20))]
    pub purpose: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TestEmailRequest {
    #[validate(length(min = 1, max = 254))]
    pub to_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendCodeResponse {
    /// Seconds until the issued code expires
    pub expire_seconds: i64,
}

impl From<SendCodeResult> for SendCodeResponse {
    fn from(result: SendCodeResult) -> Self {
        Self {
            expire_seconds: result.expire_seconds,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCodeResponse {
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub enabled: bool,
    /// Cooldown between sends, in seconds
    pub send_interval: u64,
    /// Whether outgoing email is configured
    pub configured: bool,
}

impl From<VerificationStatus> for StatusResponse {
    fn from(status: VerificationStatus) -> Self {
        Self {
            enabled: status.enabled,
            send_interval: status.send_interval_seconds,
            configured: status.configured,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_code_request_validation() {
        let valid = SendCodeRequest {
            email: "user@example.com".to_string(),
            purpose: "register".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty = SendCodeRequest {
            email: String::new(),
            purpose: "register".to_string(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_verify_code_request_rejects_long_code() {
        let request = VerifyCodeRequest {
            email: "user@example.com".to_string(),
            code: "1".repeat(17),
            purpose: "register".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_status_response_field_names() {
        let response = StatusResponse::from(VerificationStatus {
            enabled: true,
            send_interval_seconds: 60,
            configured: false,
        });
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["send_interval"], 60);
        assert_eq!(json["configured"], false);
    }
}
