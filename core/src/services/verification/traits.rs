//! Collaborator traits for email dispatch, time and non-fatal diagnostics

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

use mc_shared::utils::mask_email;

/// Trait for email service integration
#[async_trait]
pub trait EmailServiceTrait: Send + Sync {
    /// Send a verification code email valid for `expire_minutes`
    async fn send_verification_code(
        &self,
        to: &str,
        code: &str,
        expire_minutes: i64,
    ) -> Result<(), String>;
    /// Send a configuration test email
    async fn send_test_email(&self, to: &str) -> Result<(), String>;
    /// Whether enough settings exist to attempt delivery
    fn is_configured(&self) -> bool;
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A store error that the service swallowed instead of failing the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonFatalEvent {
    /// Store operation that failed (`last_send_time`, `count_since`, ...)
    pub operation: &'static str,
    pub email: String,
    pub error: String,
}

/// Receiver for swallowed errors
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, event: NonFatalEvent);
}

/// Logs non-fatal events through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, event: NonFatalEvent) {
        match event.operation {
            // Read failures weaken rate limiting, so they get more attention
            "last_send_time" | "count_since" => tracing::error!(
                email = %mask_email(&event.email),
                operation = event.operation,
                error = %event.error,
                event = "store_read_failed",
                "Verification store read failed, continuing without it"
            ),
            _ => tracing::warn!(
                email = %mask_email(&event.email),
                operation = event.operation,
                error = %event.error,
                event = "store_write_failed",
                "Verification store update failed, continuing"
            ),
        }
    }
}
