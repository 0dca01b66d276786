//! Mock email service for development and tests
//!
//! Logs messages instead of delivering them.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use mc_core::services::EmailServiceTrait;
use mc_shared::utils::mask_email;

/// A message recorded by the mock service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEmail {
    pub to: String,
    /// Verification code, `None` for test emails
    pub code: Option<String>,
    pub expire_minutes: Option<i64>,
}

/// Email service that records messages in memory
#[derive(Debug)]
pub struct MockEmailService {
    message_count: AtomicU64,
    simulate_failure: AtomicBool,
    configured: AtomicBool,
    outbox: Mutex<Vec<RecordedEmail>>,
}

impl MockEmailService {
    /// Create a configured mock that always succeeds
    pub fn new() -> Self {
        Self {
            message_count: AtomicU64::new(0),
            simulate_failure: AtomicBool::new(false),
            configured: AtomicBool::new(true),
            outbox: Mutex::new(Vec::new()),
        }
    }

    /// Make subsequent sends fail
    pub fn set_simulate_failure(&self, fail: bool) {
        self.simulate_failure.store(fail, Ordering::SeqCst);
    }

    pub fn set_configured(&self, configured: bool) {
        self.configured.store(configured, Ordering::SeqCst);
    }

    /// Number of messages accepted so far
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    pub fn reset_counter(&self) {
        self.message_count.store(0, Ordering::SeqCst);
        self.lock_outbox().clear();
    }

    /// All accepted messages in send order
    pub fn sent(&self) -> Vec<RecordedEmail> {
        self.lock_outbox().clone()
    }

    /// Code from the most recent verification email to `to`
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        self.lock_outbox()
            .iter()
            .rev()
            .find(|m| m.to == to && m.code.is_some())
            .and_then(|m| m.code.clone())
    }

    fn lock_outbox(&self) -> std::sync::MutexGuard<'_, Vec<RecordedEmail>> {
        self.outbox.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, email: RecordedEmail) -> Result<(), String> {
        if self.simulate_failure.load(Ordering::SeqCst) {
            tracing::warn!(to = %mask_email(&email.to), "Mock email service simulating failure");
            return Err("Simulated email delivery failure".to_string());
        }

        tracing::info!(
            to = %mask_email(&email.to),
            has_code = email.code.is_some(),
            "Mock email accepted"
        );
        self.message_count.fetch_add(1, Ordering::SeqCst);
        self.lock_outbox().push(email);
        Ok(())
    }
}

impl Default for MockEmailService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailServiceTrait for MockEmailService {
    async fn send_verification_code(
        &self,
        to: &str,
        code: &str,
        expire_minutes: i64,
    ) -> Result<(), String> {
        self.record(RecordedEmail {
            to: to.to_string(),
            code: Some(code.to_string()),
            expire_minutes: Some(expire_minutes),
        })
    }

    async fn send_test_email(&self, to: &str) -> Result<(), String> {
        self.record(RecordedEmail {
            to: to.to_string(),
            code: None,
            expire_minutes: None,
        })
    }

    fn is_configured(&self) -> bool {
        self.configured.load(Ordering::SeqCst)
    }
}
