//! Main verification service implementation

use std::sync::Arc;
use tracing::Instrument;

use mc_shared::logging::Logger;
use mc_shared::utils::{is_valid_email, mask_email, normalize_email};

use crate::domain::entities::{EmailVerification, VerificationPurpose};
use crate::errors::{DomainError, DomainResult, VerificationError};
use crate::repositories::VerificationCodeRepository;

use super::config::VerificationServiceConfig;
use super::generator::{CodeGenerator, OsRngCodeGenerator};
use super::locks::SendLocks;
use super::policy::RateLimitPolicy;
use super::traits::{
    Clock, DiagnosticSink, EmailServiceTrait, NonFatalEvent, SystemClock, TracingDiagnostics,
};
use super::types::{SendCodeResult, VerificationStatus};

/// Service over trait objects, as wired by the HTTP binary
pub type DynVerificationService =
    VerificationService<dyn VerificationCodeRepository, dyn EmailServiceTrait>;

/// Verification service for handling email verification codes
pub struct VerificationService<R, E>
where
    R: VerificationCodeRepository + ?Sized,
    E: EmailServiceTrait + ?Sized,
{
    /// Code store
    repository: Arc<R>,
    /// Email dispatcher
    email_service: Arc<E>,
    generator: Arc<dyn CodeGenerator>,
    clock: Arc<dyn Clock>,
    /// Receives store errors that do not fail the request
    diagnostics: Arc<dyn DiagnosticSink>,
    policy: RateLimitPolicy,
    config: VerificationServiceConfig,
    send_locks: SendLocks,
    logger: Logger,
}

impl<R, E> VerificationService<R, E>
where
    R: VerificationCodeRepository + ?Sized,
    E: EmailServiceTrait + ?Sized,
{
    /// Create a new verification service
    ///
    /// Uses the OS random generator, the system clock and tracing diagnostics;
    /// the `with_*` builders replace them.
    pub fn new(repository: Arc<R>, email_service: Arc<E>, config: VerificationServiceConfig) -> Self {
        let policy = RateLimitPolicy::new(
            config.send_interval_seconds,
            config.daily_limit,
            config.daily_window,
        );

        Self {
            repository,
            email_service,
            generator: Arc::new(OsRngCodeGenerator),
            clock: Arc::new(SystemClock),
            diagnostics: Arc::new(TracingDiagnostics),
            policy,
            config,
            send_locks: SendLocks::new(),
            logger: Logger::module("email_verification"),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn CodeGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    /// Issue a new code for `email` and email it
    ///
    /// This method:
    /// 1. Refuses when the feature is disabled or email is not configured
    /// 2. Applies the cooldown and daily cap
    /// 3. Invalidates outstanding codes for the pair
    /// 4. Generates, stores and dispatches the new code
    ///
    /// Sends for the same email and purpose are serialized within this process.
    /// A dispatch failure leaves the stored record in place.
    ///
    /// # Errors
    ///
    /// Besides the rate limit, storage and dispatch errors, returns
    /// `VerificationError::Disabled` while the `enabled` flag is off, before
    /// any other check runs.
    pub async fn generate_and_send(
        &self,
        email: &str,
        purpose: VerificationPurpose,
    ) -> DomainResult<SendCodeResult> {
        if !self.config.enabled {
            return Err(VerificationError::Disabled.into());
        }

        if !self.email_service.is_configured() {
            tracing::warn!(
                event = "email_not_configured",
                "Verification code requested but email service is not configured"
            );
            return Err(VerificationError::NotConfigured.into());
        }

        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(VerificationError::validation("email", "invalid email address").into());
        }

        let lease = self.send_locks.lease((email.clone(), purpose));
        let _guard = lease.lock().await;
        self.send_locked(&email, purpose)
            .instrument(self.logger.span())
            .await
    }

    async fn send_locked(
        &self,
        email: &str,
        purpose: VerificationPurpose,
    ) -> DomainResult<SendCodeResult> {
        let now = self.clock.now();

        let last_send_time = match self.repository.last_send_time(email, purpose).await {
            Ok(last) => last,
            Err(e) => {
                self.report("last_send_time", email, &e);
                None
            }
        };

        if let Err(e) = self.policy.check_cooldown(last_send_time, now) {
            tracing::warn!(
                email = %mask_email(email),
                purpose = %purpose,
                event = "send_too_frequent",
                "Verification code requested inside the cooldown window"
            );
            return Err(e.into());
        }

        let window_start = self.policy.window_start(now);
        let sent_in_window = match self.repository.count_since(email, window_start).await {
            Ok(count) => count,
            Err(e) => {
                self.report("count_since", email, &e);
                0
            }
        };

        if let Err(e) = self.policy.check_daily_cap(sent_in_window) {
            tracing::warn!(
                email = %mask_email(email),
                sent_in_window = sent_in_window,
                event = "daily_limit_exceeded",
                "Daily verification code limit reached"
            );
            return Err(e.into());
        }

        match self.repository.invalidate_outstanding(email, purpose).await {
            Ok(invalidated) if invalidated > 0 => {
                tracing::debug!(
                    email = %mask_email(email),
                    purpose = %purpose,
                    invalidated = invalidated,
                    event = "invalidate_previous_codes",
                    "Invalidated previous verification codes"
                );
            }
            Ok(_) => {}
            Err(e) => self.report("invalidate_outstanding", email, &e),
        }

        let code = self.generator.generate(self.config.code_length)?;
        let record = EmailVerification::new(
            email,
            code.clone(),
            purpose,
            now,
            self.config.code_expire_minutes,
        );

        let record_id = self.repository.create(record).await.map_err(|e| {
            tracing::error!(
                email = %mask_email(email),
                error = %e,
                event = "code_storage_failed",
                "Failed to store verification code"
            );
            VerificationError::PersistenceFailure(e.to_string())
        })?;

        tracing::info!(
            email = %mask_email(email),
            purpose = %purpose,
            record_id = %record_id,
            event = "code_generated",
            "Generated new verification code"
        );

        self.email_service
            .send_verification_code(email, &code, self.config.code_expire_minutes)
            .await
            .map_err(|e| {
                tracing::error!(
                    email = %mask_email(email),
                    record_id = %record_id,
                    error = %e,
                    event = "code_dispatch_failed",
                    "Failed to send verification email"
                );
                VerificationError::DispatchFailure(e)
            })?;

        tracing::info!(
            email = %mask_email(email),
            purpose = %purpose,
            event = "code_sent",
            "Verification code sent"
        );

        Ok(SendCodeResult {
            expire_seconds: self.config.expire_seconds(),
        })
    }

    /// Check `code` and consume it on success
    ///
    /// Wrong, expired, already used or unknown codes all yield `false`
    /// with no side effects. When two requests race on the same code only the
    /// one whose `mark_used` performs the transition gets `true`.
    pub async fn verify(&self, email: &str, code: &str, purpose: VerificationPurpose) -> bool {
        let email = normalize_email(email);
        let code = code.trim();
        if email.is_empty() || code.is_empty() {
            return false;
        }

        let now = self.clock.now();
        let record = match self.repository.find_valid(&email, code, purpose, now).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::info!(
                    email = %mask_email(&email),
                    purpose = %purpose,
                    event = "code_verification_failed",
                    "Verification code did not match a valid record"
                );
                return false;
            }
            Err(e) => {
                self.report("find_valid", &email, &e);
                return false;
            }
        };

        match self.repository.mark_used(record.id).await {
            Ok(true) => {
                tracing::info!(
                    email = %mask_email(&email),
                    purpose = %purpose,
                    event = "code_verified",
                    "Verification code verified"
                );
                true
            }
            Ok(false) => {
                tracing::warn!(
                    email = %mask_email(&email),
                    record_id = %record.id,
                    event = "code_already_consumed",
                    "Verification code was consumed by a concurrent request"
                );
                false
            }
            Err(e) => {
                self.report("mark_used", &email, &e);
                true
            }
        }
    }

    /// Feature flag, cooldown and dispatcher configuration state
    pub fn status(&self) -> VerificationStatus {
        VerificationStatus {
            enabled: self.config.enabled,
            send_interval_seconds: self.config.send_interval_seconds,
            configured: self.email_service.is_configured(),
        }
    }

    /// Delete expired and used records
    pub async fn clean_expired_codes(&self) -> DomainResult<u64> {
        let removed = self
            .repository
            .delete_expired_or_used(self.clock.now())
            .await?;
        if removed > 0 {
            self.logger
                .info(format_args!("Removed {} expired or used verification codes", removed));
        }
        Ok(removed)
    }

    /// Send a test email to check the dispatcher configuration
    pub async fn send_test_email(&self, to: &str) -> DomainResult<()> {
        if !self.email_service.is_configured() {
            return Err(VerificationError::NotConfigured.into());
        }

        let to = normalize_email(to);
        if !is_valid_email(&to) {
            return Err(VerificationError::validation("to_email", "invalid email address").into());
        }

        self.email_service.send_test_email(&to).await.map_err(|e| {
            tracing::error!(
                email = %mask_email(&to),
                error = %e,
                event = "test_email_failed",
                "Failed to send test email"
            );
            DomainError::from(VerificationError::DispatchFailure(e))
        })?;

        self.logger
            .info(format_args!("Test email sent to {}", mask_email(&to)));
        Ok(())
    }

    fn report(&self, operation: &'static str, email: &str, error: &DomainError) {
        self.diagnostics.report(NonFatalEvent {
            operation,
            email: email.to_string(),
            error: error.to_string(),
        });
    }

    #[cfg(test)]
    pub(crate) fn pending_send_locks(&self) -> usize {
        self.send_locks.len()
    }
}
