//! Application factory
//!
//! Builds the Actix-web application around a shared `AppState`.

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    error::JsonPayloadError,
    http::StatusCode,
    web, App, Error, HttpRequest, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use mc_shared::errors::{error_codes, ErrorResponse};

use crate::handlers::ApiError;
use crate::middleware::{ErrorHandlingExt, RequestIdMiddleware};
use crate::routes::{self, AppState};

/// Create and configure the application with all dependencies
pub fn create_app(
    app_state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(app_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        // Request id is assigned before the tracing span is opened
        .wrap(TracingLogger::default())
        .wrap(RequestIdMiddleware)
        .configure(routes::configure)
        .default_service(web::route().to(not_found))
}

/// Malformed JSON bodies answer with the standard error shape
fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    tracing::debug!(error = %err, "Rejected malformed JSON body");
    ApiError::new(
        StatusCode::BAD_REQUEST,
        error_codes::VALIDATION_ERROR,
        format!("Invalid JSON body: {}", err),
    )
    .with_request_id(req.get_request_id())
    .into()
}

/// Default 404 handler
async fn not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(
        ErrorResponse::new(error_codes::NOT_FOUND, "The requested resource was not found")
            .with_request_id(req.get_request_id()),
    )
}
