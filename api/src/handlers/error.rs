//! Mapping of domain errors onto HTTP responses

use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use std::collections::HashMap;
use std::fmt;
use validator::ValidationErrors;

use mc_core::errors::{DomainError, VerificationError};
use mc_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};

/// An error response ready to be returned from a handler
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
    /// Seconds for the `Retry-After` header
    retry_after: Option<u64>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse::new(code, message),
            retry_after: None,
        }
    }

    /// Map a domain error to its status code and error code
    pub fn from_domain(error: &DomainError) -> Self {
        match error {
            DomainError::Verification(err) => Self::from_verification(err),
            DomainError::Validation { message } => {
                Self::new(StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR, message.clone())
            }
            DomainError::NotFound { resource } => Self::new(
                StatusCode::NOT_FOUND,
                error_codes::NOT_FOUND,
                format!("{} not found", resource),
            ),
            DomainError::Internal { .. } => Self::internal(),
        }
    }

    fn from_verification(error: &VerificationError) -> Self {
        match error {
            VerificationError::TooFrequent { seconds_remaining } => {
                let mut api_error = Self::new(
                    StatusCode::TOO_MANY_REQUESTS,
                    error_codes::TOO_FREQUENT,
                    error.to_string(),
                );
                api_error.body = api_error.body.add_detail("retry_after", seconds_remaining);
                api_error.retry_after = Some(*seconds_remaining);
                api_error
            }
            VerificationError::DailyLimitExceeded { limit } => {
                let mut api_error = Self::new(
                    StatusCode::TOO_MANY_REQUESTS,
                    error_codes::DAILY_LIMIT_EXCEEDED,
                    error.to_string(),
                );
                api_error.body = api_error.body.add_detail("limit", limit);
                api_error
            }
            VerificationError::NotConfigured => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                error_codes::NOT_CONFIGURED,
                error.to_string(),
            ),
            VerificationError::Disabled => Self::new(
                StatusCode::FORBIDDEN,
                error_codes::FEATURE_DISABLED,
                error.to_string(),
            ),
            VerificationError::ValidationFailed { field, message } => {
                Self::new(StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR, error.to_string())
                    .with_detail("field", field)
                    .with_detail("reason", message)
            }
            VerificationError::DispatchFailure(_) => Self::new(
                StatusCode::BAD_GATEWAY,
                error_codes::EMAIL_SEND_FAILED,
                "Failed to send email",
            ),
            VerificationError::GenerationFailure(_) | VerificationError::PersistenceFailure(_) => {
                Self::internal()
            }
        }
    }

    /// 400 built from `validator` field errors
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let fields: HashMap<String, Vec<String>> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        Self::new(
            StatusCode::BAD_REQUEST,
            error_codes::VALIDATION_ERROR,
            "Invalid request data",
        )
        .with_detail("fields", fields)
    }

    /// 400 for a single bad field
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR, message)
            .with_detail("field", field)
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            "An internal error occurred",
        )
    }

    pub fn with_detail(mut self, key: &str, value: impl serde::Serialize) -> Self {
        self.body = self.body.add_detail(key, value);
        self
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.body = self.body.with_request_id(request_id);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &str {
        &self.body.error
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.body.error, self.body.message)
    }
}

impl IntoErrorResponse for ApiError {
    fn to_error_response(&self) -> ErrorResponse {
        self.body.clone()
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status);
        if let Some(seconds) = self.retry_after {
            builder.insert_header((header::RETRY_AFTER, seconds.to_string()));
        }
        builder.json(self.to_error_response())
    }
}
