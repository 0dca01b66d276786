use actix_web::{web, HttpRequest, HttpResponse};

use mc_shared::types::ApiResponse;

use crate::dto::StatusResponse;
use crate::middleware::ErrorHandlingExt;
use crate::routes::AppState;

/// Handler for GET /api/v1/auth/email/status
pub async fn status(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let status = StatusResponse::from(state.verification_service.status());
    HttpResponse::Ok().json(ApiResponse::success(status).with_request_id(req.get_request_id()))
}
