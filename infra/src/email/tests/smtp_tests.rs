//! Unit tests for SMTP email service

use crate::email::templates::verification_code;
use crate::email::{create_email_service, SmtpEmailService};
use crate::InfrastructureError;
use mc_core::services::EmailServiceTrait;
use mc_shared::config::{SmtpConfig, SmtpEncryption};

fn plain_config() -> SmtpConfig {
    SmtpConfig {
        host: "localhost".to_string(),
        port: 2525,
        from_email: "noreply@example.com".to_string(),
        from_name: "Cli-Proxy".to_string(),
        encryption: "none".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_unconfigured_service_refuses_to_send() {
    let service = SmtpEmailService::new(SmtpConfig::default()).unwrap();
    assert!(!service.is_configured());

    let result = service
        .send_verification_code("user@example.com", "123456", 10)
        .await;
    let message = result.unwrap_err();
    assert!(message.contains("incomplete"));
}

#[test]
fn test_configured_service() {
    let service = SmtpEmailService::new(plain_config()).unwrap();
    assert!(service.is_configured());
    assert_eq!(service.config().effective_port(), 2525);
}

#[test]
fn test_starttls_transport_builds() {
    let config = SmtpConfig {
        host: "smtp.example.com".to_string(),
        username: "mailer".to_string(),
        password: "secret".to_string(),
        encryption: "starttls".to_string(),
        ..plain_config()
    };

    let service = SmtpEmailService::new(config).unwrap();
    assert!(service.is_configured());
}

#[test]
fn test_tls_setting_uses_starttls_transport() {
    let config = SmtpConfig {
        host: "smtp.example.com".to_string(),
        encryption: "tls".to_string(),
        ..plain_config()
    };

    let service = SmtpEmailService::new(config).unwrap();
    assert_eq!(service.encryption(), SmtpEncryption::Starttls);
    assert!(service.is_configured());
}

#[test]
fn test_build_message_headers() {
    let service = SmtpEmailService::new(plain_config()).unwrap();
    let content = verification_code("Cli-Proxy", "123456", 10);

    let message = service.build_message("user@example.com", &content).unwrap();
    let formatted = String::from_utf8_lossy(&message.formatted()).to_string();

    assert!(formatted.contains("Subject: Cli-Proxy verification code"));
    assert!(formatted.contains("noreply@example.com"));
    assert!(formatted.contains("user@example.com"));
    assert!(formatted.contains("multipart/alternative"));
}

#[test]
fn test_build_message_rejects_bad_recipient() {
    let service = SmtpEmailService::new(plain_config()).unwrap();
    let content = verification_code("Cli-Proxy", "123456", 10);

    let result = service.build_message("not-an-email", &content);
    assert!(matches!(result, Err(InfrastructureError::Address(_))));
}

#[test]
fn test_sender_uses_default_name_when_blank() {
    let config = SmtpConfig {
        from_name: String::new(),
        ..plain_config()
    };
    let service = SmtpEmailService::new(config).unwrap();

    let sender = service.sender().unwrap();
    assert_eq!(sender.name.as_deref(), Some("Cli-Proxy"));
    assert_eq!(sender.email.to_string(), "noreply@example.com");
}

#[test]
fn test_create_email_service_reports_configuration() {
    let unconfigured = create_email_service(&SmtpConfig::default()).unwrap();
    assert!(!unconfigured.is_configured());

    let configured = create_email_service(&plain_config()).unwrap();
    assert!(configured.is_configured());
}
