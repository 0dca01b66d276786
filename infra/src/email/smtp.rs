//! SMTP email delivery using lettre
//!
//! The transport is chosen from the configured encryption mode:
//! - `ssl`: implicit TLS (`relay`), usually port 465
//! - `starttls`: upgraded connection (`starttls_relay`), usually port 587
//! - `none`: plain connection (`builder_dangerous`)

use async_trait::async_trait;
use lettre::message::{header, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{error, info};

use mc_core::services::EmailServiceTrait;
use mc_shared::config::{SmtpConfig, SmtpEncryption};
use mc_shared::utils::mask_email;

use crate::email::templates::{self, EmailContent};
use crate::InfrastructureError;

/// Sends verification and test emails through an SMTP relay
pub struct SmtpEmailService {
    config: SmtpConfig,
    encryption: SmtpEncryption,
    /// `None` when host or sender address is missing
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpEmailService {
    /// Create a new SMTP email service
    ///
    /// An incomplete configuration is accepted; the service then reports
    /// itself as not configured and refuses to send.
    pub fn new(config: SmtpConfig) -> Result<Self, InfrastructureError> {
        let encryption = config.encryption_mode();
        let transport = if config.is_configured() {
            Some(Self::build_transport(&config, encryption)?)
        } else {
            None
        };

        info!(
            host = %config.host,
            port = config.effective_port(),
            encryption = encryption.as_str(),
            configured = transport.is_some(),
            "SMTP email service initialized"
        );

        Ok(Self {
            config,
            encryption,
            transport,
        })
    }

    fn build_transport(
        config: &SmtpConfig,
        encryption: SmtpEncryption,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, InfrastructureError> {
        let host = config.host.trim();
        let builder = match encryption {
            SmtpEncryption::Ssl => AsyncSmtpTransport::<Tokio1Executor>::relay(host)?,
            SmtpEncryption::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?,
            SmtpEncryption::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
        };

        let mut builder = builder
            .port(config.effective_port())
            .timeout(Some(Duration::from_secs(config.timeout_secs)));

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(builder.build())
    }

    /// Encryption mode resolved at construction
    pub fn encryption(&self) -> SmtpEncryption {
        self.encryption
    }

    /// Sender mailbox built from the configured address and display name
    pub fn sender(&self) -> Result<Mailbox, InfrastructureError> {
        let address: Address = self.config.from_email.trim().parse()?;
        Ok(Mailbox::new(
            Some(self.config.effective_from_name().to_string()),
            address,
        ))
    }

    /// Assemble a multipart/alternative message for `to`
    pub fn build_message(
        &self,
        to: &str,
        content: &EmailContent,
    ) -> Result<Message, InfrastructureError> {
        let recipient: Mailbox = to.trim().parse()?;

        let body = MultiPart::alternative()
            .singlepart(
                SinglePart::builder()
                    .header(header::ContentType::TEXT_PLAIN)
                    .body(content.text.clone()),
            )
            .singlepart(
                SinglePart::builder()
                    .header(header::ContentType::TEXT_HTML)
                    .body(content.html.clone()),
            );

        let message = Message::builder()
            .from(self.sender()?)
            .to(recipient)
            .subject(content.subject.as_str())
            .multipart(body)?;

        Ok(message)
    }

    /// Deliver rendered content to `to`
    pub async fn send(&self, to: &str, content: EmailContent) -> Result<(), InfrastructureError> {
        let transport = self.transport.as_ref().ok_or_else(|| {
            InfrastructureError::Config(
                "SMTP settings are incomplete, configure host and sender address".to_string(),
            )
        })?;

        let message = self.build_message(to, &content)?;

        info!(
            to = %mask_email(to),
            subject = %content.subject,
            event = "email_sending",
            "Sending email"
        );

        match transport.send(message).await {
            Ok(_) => {
                info!(to = %mask_email(to), event = "email_sent", "Email sent");
                Ok(())
            }
            Err(e) => {
                error!(
                    to = %mask_email(to),
                    error = %e,
                    event = "email_send_failed",
                    "Email delivery failed"
                );
                Err(InfrastructureError::Smtp(e))
            }
        }
    }

    pub fn config(&self) -> &SmtpConfig {
        &self.config
    }
}

#[async_trait]
impl EmailServiceTrait for SmtpEmailService {
    async fn send_verification_code(
        &self,
        to: &str,
        code: &str,
        expire_minutes: i64,
    ) -> Result<(), String> {
        let content =
            templates::verification_code(self.config.effective_from_name(), code, expire_minutes);
        self.send(to, content).await.map_err(|e| e.to_string())
    }

    async fn send_test_email(&self, to: &str) -> Result<(), String> {
        let content = templates::configuration_test(self.config.effective_from_name());
        self.send(to, content).await.map_err(|e| e.to_string())
    }

    fn is_configured(&self) -> bool {
        self.transport.is_some()
    }
}
