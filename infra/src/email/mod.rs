//! Email Service Module
//!
//! Delivery of verification code and configuration test emails.
//!
//! ## Features
//!
//! - **SMTP**: lettre transport with ssl, starttls or plain connections
//! - **Templates**: HTML bodies with plain-text alternatives
//! - **Mock Implementation**: In-memory outbox for development and tests
//! - **Security**: Recipient addresses are masked in logs

use std::sync::Arc;

use mc_core::services::EmailServiceTrait;
use mc_shared::config::SmtpConfig;

pub mod mock;
pub mod smtp;
pub mod templates;

pub use mock::{MockEmailService, RecordedEmail};
pub use smtp::SmtpEmailService;
pub use templates::EmailContent;

#[cfg(test)]
mod tests;

/// Create the email service for the given SMTP settings
///
/// Incomplete settings still produce a service; it reports itself as not
/// configured so sends are refused with a clear error.
pub fn create_email_service(
    config: &SmtpConfig,
) -> Result<Arc<dyn EmailServiceTrait>, crate::InfrastructureError> {
    if !config.is_configured() {
        tracing::warn!("SMTP host or sender address missing, email delivery disabled");
    }
    Ok(Arc::new(SmtpEmailService::new(config.clone())?))
}
