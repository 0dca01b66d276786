use actix_web::HttpResponse;

use mc_shared::types::HealthResponse;

/// Handler for GET /health
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}
