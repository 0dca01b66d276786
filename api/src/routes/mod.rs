//! Route handlers and application state

pub mod admin;
pub mod auth;
pub mod health;

use actix_web::web;
use std::sync::Arc;

use mc_core::services::DynVerificationService;

/// Application state that holds shared services
pub struct AppState {
    pub verification_service: Arc<DynVerificationService>,
}

impl AppState {
    pub fn new(verification_service: Arc<DynVerificationService>) -> Self {
        Self {
            verification_service,
        }
    }
}

/// Register all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check)).service(
        web::scope("/api/v1")
            .service(
                web::scope("/auth/email")
                    .route("/send-code", web::post().to(auth::send_code::send_code))
                    .route("/verify-code", web::post().to(auth::verify_code::verify_code))
                    .route("/status", web::get().to(auth::status::status)),
            )
            .service(
                web::scope("/admin/email")
                    .route("/test", web::post().to(admin::test_email::test_email)),
            ),
    );
}
