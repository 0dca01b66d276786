//! Code store trait defining persistence of email verification records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{EmailVerification, VerificationPurpose};
use crate::errors::DomainError;

/// Repository trait for EmailVerification persistence operations
///
/// Implementations own all persisted verification state. Emails passed in are
/// already normalized by the service.
#[async_trait]
pub trait VerificationCodeRepository: Send + Sync {
    /// Persist a new record
    ///
    /// # Returns
    /// * `Ok(Uuid)` - The id of the stored record
    /// * `Err(DomainError)` - Storage failed
    async fn create(&self, record: EmailVerification) -> Result<Uuid, DomainError>;

    /// Most recently created record for the pair, regardless of state
    async fn find_latest(
        &self,
        email: &str,
        purpose: VerificationPurpose,
    ) -> Result<Option<EmailVerification>, DomainError>;

    /// The record matching all fields that is unused and unexpired at `now`
    ///
    /// This is the single source of truth for "does this code work now".
    async fn find_valid(
        &self,
        email: &str,
        code: &str,
        purpose: VerificationPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<EmailVerification>, DomainError>;

    /// Flip `used` to true
    ///
    /// # Returns
    /// * `Ok(true)` - This call performed the false to true transition
    /// * `Ok(false)` - Already used, or no such record
    /// * `Err(DomainError)` - Storage failed
    async fn mark_used(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Number of records for `email` (any purpose) created at or after `window_start`
    async fn count_since(
        &self,
        email: &str,
        window_start: DateTime<Utc>,
    ) -> Result<u64, DomainError>;

    /// Creation time of the most recent record for the pair; `None` if there is none
    async fn last_send_time(
        &self,
        email: &str,
        purpose: VerificationPurpose,
    ) -> Result<Option<DateTime<Utc>>, DomainError>;

    /// Mark every unused record for the pair as used
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of records invalidated
    async fn invalidate_outstanding(
        &self,
        email: &str,
        purpose: VerificationPurpose,
    ) -> Result<u64, DomainError>;

    /// Delete records that are expired at `now` or already used
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of records removed
    async fn delete_expired_or_used(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;
}
