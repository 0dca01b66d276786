//! Unit tests for mock email service

use crate::email::MockEmailService;
use mc_core::services::EmailServiceTrait;

#[tokio::test]
async fn test_mock_send_success() {
    let service = MockEmailService::new();
    let result = service
        .send_verification_code("user@example.com", "123456", 10)
        .await;

    assert!(result.is_ok());
    assert_eq!(service.get_message_count(), 1);
    assert_eq!(
        service.last_code_for("user@example.com").as_deref(),
        Some("123456")
    );
    assert_eq!(service.sent()[0].expire_minutes, Some(10));
}

#[tokio::test]
async fn test_mock_simulate_failure() {
    let service = MockEmailService::new();
    service.set_simulate_failure(true);

    let result = service.send_test_email("user@example.com").await;
    assert!(result.is_err());
    assert_eq!(service.get_message_count(), 0);
    assert!(service.sent().is_empty());
}

#[tokio::test]
async fn test_mock_counter() {
    let service = MockEmailService::new();

    for i in 1..=3 {
        let _ = service
            .send_verification_code("user@example.com", &format!("00000{}", i), 10)
            .await;
        assert_eq!(service.get_message_count(), i);
    }
    assert_eq!(
        service.last_code_for("user@example.com").as_deref(),
        Some("000003")
    );

    service.reset_counter();
    assert_eq!(service.get_message_count(), 0);
    assert!(service.last_code_for("user@example.com").is_none());
}

#[tokio::test]
async fn test_mock_test_email_has_no_code() {
    let service = MockEmailService::new();
    service.send_test_email("admin@example.com").await.unwrap();

    assert_eq!(service.get_message_count(), 1);
    assert!(service.last_code_for("admin@example.com").is_none());
}

#[test]
fn test_mock_configured_flag() {
    let service = MockEmailService::default();
    assert!(service.is_configured());

    service.set_configured(false);
    assert!(!service.is_configured());
}
