use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use mc_shared::types::ApiResponse;
use mc_shared::utils::mask_email;

use crate::dto::{SendCodeRequest, SendCodeResponse};
use crate::handlers::ApiError;
use crate::middleware::ErrorHandlingExt;
use crate::routes::AppState;

use super::parse_purpose;

/// Handler for POST /api/v1/auth/email/send-code
///
/// Issues a verification code for the email and purpose and emails it.
///
/// # Request Body
///
/// ```json
/// {
///     "email": "user@example.com",
///     "purpose": "register"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "success": true,
///     "data": { "expire_seconds": 600 },
///     "timestamp": "2025-08-14T10:00:00Z",
///     "request_id": "550e8400-e29b-41d4-a716-446655440000"
/// }
/// ```
///
/// ## Errors
/// - 400 `VALIDATION_ERROR`: bad email or purpose
/// - 403 `FEATURE_DISABLED`: email verification is switched off
/// - 429 `TOO_FREQUENT` (with `retry_after`) or `DAILY_LIMIT_EXCEEDED` (with `limit`)
/// - 502 `EMAIL_SEND_FAILED`: the relay refused the message
/// - 503 `NOT_CONFIGURED`: SMTP is not set up
pub async fn send_code(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<SendCodeRequest>,
) -> Result<HttpResponse, ApiError> {
    let request_id = req.get_request_id();

    if let Err(errors) = request.validate() {
        tracing::warn!(event = "send_code_invalid", "Validation failed for send_code request");
        return Err(ApiError::from_validation(&errors).with_request_id(request_id));
    }

    let purpose = parse_purpose(&request.purpose).map_err(|e| e.with_request_id(request_id.clone()))?;

    tracing::info!(
        email = %mask_email(&request.email),
        purpose = %purpose,
        event = "send_code_requested",
        "Processing send_code request"
    );

    match state
        .verification_service
        .generate_and_send(&request.email, purpose)
        .await
    {
        Ok(result) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(SendCodeResponse::from(result)).with_request_id(request_id),
        )),
        Err(error) => {
            tracing::info!(
                email = %mask_email(&request.email),
                purpose = %purpose,
                error = %error,
                event = "send_code_refused",
                "Verification code not sent"
            );
            Err(ApiError::from_domain(&error).with_request_id(request_id))
        }
    }
}
