use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use mc_shared::types::ApiResponse;
use mc_shared::utils::mask_email;

use crate::dto::{MessageResponse, TestEmailRequest};
use crate::handlers::ApiError;
use crate::middleware::ErrorHandlingExt;
use crate::routes::AppState;

/// Handler for POST /api/v1/admin/email/test
///
/// Sends a configuration test email. Access control is left to the
/// deployment in front of this service.
pub async fn test_email(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<TestEmailRequest>,
) -> Result<HttpResponse, ApiError> {
    let request_id = req.get_request_id();

    if let Err(errors) = request.validate() {
        return Err(ApiError::from_validation(&errors).with_request_id(request_id));
    }

    tracing::info!(
        to = %mask_email(&request.to_email),
        event = "test_email_requested",
        "Sending configuration test email"
    );

    state
        .verification_service
        .send_test_email(&request.to_email)
        .await
        .map_err(|error| ApiError::from_domain(&error).with_request_id(request_id.clone()))?;

    Ok(HttpResponse::Ok().json(
        ApiResponse::success(MessageResponse {
            message: "Test email sent".to_string(),
        })
        .with_request_id(request_id),
    ))
}
