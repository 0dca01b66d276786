//! HTTP-level tests for the email verification endpoints

use actix_web::{http::header, http::StatusCode, test, web};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

use mc_api::{create_app, AppState};
use mc_core::repositories::{InMemoryVerificationCodeRepository, VerificationCodeRepository};
use mc_core::services::verification::{FixedCodeGenerator, ManualClock};
use mc_core::services::{
    DynVerificationService, EmailServiceTrait, VerificationService, VerificationServiceConfig,
};
use mc_infra::email::MockEmailService;

const CODE: &str = "123456";

struct TestContext {
    state: web::Data<AppState>,
    email: Arc<MockEmailService>,
    clock: Arc<ManualClock>,
}

fn context(config: VerificationServiceConfig) -> TestContext {
    let repository: Arc<dyn VerificationCodeRepository> =
        Arc::new(InMemoryVerificationCodeRepository::new());
    let email = Arc::new(MockEmailService::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
    ));

    let email_service: Arc<dyn EmailServiceTrait> = email.clone();
    let service: DynVerificationService =
        VerificationService::new(repository, email_service, config)
            .with_generator(Arc::new(FixedCodeGenerator::new(CODE)))
            .with_clock(clock.clone());

    TestContext {
        state: web::Data::new(AppState::new(Arc::new(service))),
        email,
        clock,
    }
}

fn default_context() -> TestContext {
    context(VerificationServiceConfig::default())
}

fn send_code_request(email: &str, purpose: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/auth/email/send-code")
        .set_json(json!({ "email": email, "purpose": purpose }))
}

fn verify_code_request(email: &str, code: &str, purpose: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/auth/email/verify-code")
        .set_json(json!({ "email": email, "code": code, "purpose": purpose }))
}

#[actix_web::test]
async fn test_health_check() {
    let ctx = default_context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_send_code_success() {
    let ctx = default_context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = send_code_request("User@Example.com", "register")
        .insert_header(("X-Request-ID", "req-send-1"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "req-send-1");

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["expire_seconds"], 600);
    assert_eq!(body["request_id"], "req-send-1");

    // Address is normalized before dispatch
    assert_eq!(ctx.email.get_message_count(), 1);
    assert_eq!(
        ctx.email.last_code_for("user@example.com").as_deref(),
        Some(CODE)
    );
}

#[actix_web::test]
async fn test_send_code_too_frequent() {
    let ctx = default_context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let first = test::call_service(&app, send_code_request("user@example.com", "register").to_request()).await;
    assert_eq!(first.status(), StatusCode::OK);

    ctx.clock.advance(Duration::seconds(30));
    let req = send_code_request("user@example.com", "register")
        .insert_header(("X-Request-ID", "req-too-soon"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp.headers().get(header::RETRY_AFTER).unwrap(), "30");

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "TOO_FREQUENT");
    assert_eq!(body["details"]["retry_after"], 30);
    assert_eq!(body["request_id"], "req-too-soon");
    assert_eq!(ctx.email.get_message_count(), 1);
}

#[actix_web::test]
async fn test_send_code_daily_limit() {
    let ctx = context(VerificationServiceConfig {
        daily_limit: 1,
        ..Default::default()
    });
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let first = test::call_service(&app, send_code_request("user@example.com", "register").to_request()).await;
    assert_eq!(first.status(), StatusCode::OK);

    ctx.clock.advance(Duration::seconds(61));
    let resp = test::call_service(&app, send_code_request("user@example.com", "register").to_request()).await;

    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "DAILY_LIMIT_EXCEEDED");
    assert_eq!(body["details"]["limit"], 1);
}

#[actix_web::test]
async fn test_send_code_rejects_unknown_purpose() {
    let ctx = default_context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let resp = test::call_service(&app, send_code_request("user@example.com", "login").to_request()).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["details"]["field"], "purpose");
    assert_eq!(ctx.email.get_message_count(), 0);
}

#[actix_web::test]
async fn test_send_code_rejects_invalid_email() {
    let ctx = default_context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let resp = test::call_service(&app, send_code_request("not-an-email", "register").to_request()).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["details"]["field"], "email");
}

#[actix_web::test]
async fn test_send_code_rejects_malformed_json() {
    let ctx = default_context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/email/send-code")
        .insert_header(header::ContentType::json())
        .set_payload("{\"email\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn test_send_code_when_not_configured() {
    let ctx = default_context();
    ctx.email.set_configured(false);
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let resp = test::call_service(&app, send_code_request("user@example.com", "register").to_request()).await;

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "NOT_CONFIGURED");
}

#[actix_web::test]
async fn test_send_code_when_disabled() {
    let ctx = context(VerificationServiceConfig {
        enabled: false,
        ..Default::default()
    });
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let resp = test::call_service(&app, send_code_request("user@example.com", "register").to_request()).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "FEATURE_DISABLED");
}

#[actix_web::test]
async fn test_send_code_dispatch_failure() {
    let ctx = default_context();
    ctx.email.set_simulate_failure(true);
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let resp = test::call_service(&app, send_code_request("user@example.com", "register").to_request()).await;

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "EMAIL_SEND_FAILED");
}

#[actix_web::test]
async fn test_verify_code_flow() {
    let ctx = default_context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let sent = test::call_service(&app, send_code_request("user@example.com", "register").to_request()).await;
    assert_eq!(sent.status(), StatusCode::OK);

    // Other purpose does not accept the code
    let resp = test::call_service(
        &app,
        verify_code_request("user@example.com", CODE, "reset_password").to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["verified"], false);

    let resp = test::call_service(
        &app,
        verify_code_request(" USER@example.com ", CODE, "register").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["verified"], true);

    // Single use
    let resp = test::call_service(
        &app,
        verify_code_request("user@example.com", CODE, "register").to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["verified"], false);
}

#[actix_web::test]
async fn test_verify_code_wrong_code_is_false_not_error() {
    let ctx = default_context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let resp = test::call_service(
        &app,
        verify_code_request("nobody@example.com", "000000", "register").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["verified"], false);
}

#[actix_web::test]
async fn test_status() {
    let ctx = default_context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/auth/email/status").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["enabled"], true);
    assert_eq!(body["data"]["send_interval"], 60);
    assert_eq!(body["data"]["configured"], true);
}

#[actix_web::test]
async fn test_admin_test_email() {
    let ctx = default_context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/admin/email/test")
        .set_json(json!({ "to_email": "admin@example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["message"], "Test email sent");
    assert_eq!(ctx.email.get_message_count(), 1);
    assert!(ctx.email.last_code_for("admin@example.com").is_none());
}

#[actix_web::test]
async fn test_unknown_route_is_not_found() {
    let ctx = default_context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/nope").to_request()).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "NOT_FOUND");
    assert!(body["request_id"].is_string());
}
