use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use mc_shared::types::ApiResponse;
use mc_shared::utils::mask_email;

use crate::dto::{VerifyCodeRequest, VerifyCodeResponse};
use crate::handlers::ApiError;
use crate::middleware::ErrorHandlingExt;
use crate::routes::AppState;

use super::parse_purpose;

/// Handler for POST /api/v1/auth/email/verify-code
///
/// Consumes the code if it is valid. Wrong, expired, used and unknown codes all
/// answer `{"verified": false}` with status 200.
pub async fn verify_code(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<VerifyCodeRequest>,
) -> Result<HttpResponse, ApiError> {
    let request_id = req.get_request_id();

    if let Err(errors) = request.validate() {
        return Err(ApiError::from_validation(&errors).with_request_id(request_id));
    }

    let purpose = parse_purpose(&request.purpose).map_err(|e| e.with_request_id(request_id.clone()))?;

    let verified = state
        .verification_service
        .verify(&request.email, &request.code, purpose)
        .await;

    tracing::info!(
        email = %mask_email(&request.email),
        purpose = %purpose,
        verified,
        event = "verify_code",
        "Verification code checked"
    );

    Ok(HttpResponse::Ok()
        .json(ApiResponse::success(VerifyCodeResponse { verified }).with_request_id(request_id)))
}
