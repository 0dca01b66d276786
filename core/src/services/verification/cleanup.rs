//! Periodic removal of expired and used verification records

use std::sync::Arc;
use tracing::{error, info, warn};

use mc_shared::config::CleanupConfig;

use crate::errors::DomainError;
use crate::repositories::VerificationCodeRepository;

use super::traits::{Clock, SystemClock};

/// Service for sweeping expired and used codes out of the store
pub struct CodeCleanupService<R: VerificationCodeRepository + ?Sized + 'static> {
    repository: Arc<R>,
    config: CleanupConfig,
    clock: Arc<dyn Clock>,
}

impl<R: VerificationCodeRepository + ?Sized + 'static> CodeCleanupService<R> {
    pub fn new(repository: Arc<R>, config: CleanupConfig) -> Self {
        Self {
            repository,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run a single cleanup cycle
    ///
    /// # Returns
    /// * `Ok(CleanupResult)` - Summary of the sweep (empty when disabled)
    /// * `Err(DomainError)` - The store rejected the delete
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        let removed = self
            .repository
            .delete_expired_or_used(self.clock.now())
            .await?;

        info!(
            removed = removed,
            event = "verification_cleanup",
            "Verification code cleanup completed"
        );

        Ok(CleanupResult {
            records_deleted: removed,
        })
    }

    /// Start the cleanup service as a background task
    ///
    /// This spawns a tokio task that runs cleanup at regular intervals.
    /// Returns `None` when cleanup is disabled.
    pub fn start_background_task(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Verification code cleanup is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds.max(1));

        Some(tokio::spawn(async move {
            info!(
                interval_seconds = self.config.interval_seconds,
                "Verification code cleanup task started"
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                if let Err(e) = self.run_cleanup().await {
                    error!(error = %e, "Verification code cleanup cycle failed");
                }
            }
        }))
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupResult {
    /// Number of expired or used records deleted
    pub records_deleted: u64,
}
