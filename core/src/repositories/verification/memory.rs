//! In-memory code store for tests and single-process development setups

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{EmailVerification, VerificationPurpose};
use crate::errors::DomainError;

use super::r#trait::VerificationCodeRepository;

/// Process-local verification code repository
#[derive(Clone)]
pub struct InMemoryVerificationCodeRepository {
    records: Arc<RwLock<HashMap<Uuid, EmailVerification>>>,
}

impl InMemoryVerificationCodeRepository {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Snapshot of all records for the pair, oldest first
    pub async fn records_for(
        &self,
        email: &str,
        purpose: VerificationPurpose,
    ) -> Vec<EmailVerification> {
        let records = self.records.read().await;
        let mut matching: Vec<EmailVerification> = records
            .values()
            .filter(|r| r.email == email && r.purpose == purpose)
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.created_at);
        matching
    }

    pub async fn get(&self, id: Uuid) -> Option<EmailVerification> {
        self.records.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for InMemoryVerificationCodeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VerificationCodeRepository for InMemoryVerificationCodeRepository {
    async fn create(&self, record: EmailVerification) -> Result<Uuid, DomainError> {
        let mut records = self.records.write().await;

        if records.contains_key(&record.id) {
            return Err(DomainError::Validation {
                message: format!("Verification record {} already exists", record.id),
            });
        }

        let id = record.id;
        records.insert(id, record);
        Ok(id)
    }

    async fn find_latest(
        &self,
        email: &str,
        purpose: VerificationPurpose,
    ) -> Result<Option<EmailVerification>, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.email == email && r.purpose == purpose)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn find_valid(
        &self,
        email: &str,
        code: &str,
        purpose: VerificationPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<EmailVerification>, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.matches(email, code, purpose) && r.is_valid_at(now))
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn mark_used(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        Ok(records
            .get_mut(&id)
            .map(|record| record.mark_used())
            .unwrap_or(false))
    }

    async fn count_since(
        &self,
        email: &str,
        window_start: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.email == email && r.created_at >= window_start)
            .count() as u64)
    }

    async fn last_send_time(
        &self,
        email: &str,
        purpose: VerificationPurpose,
    ) -> Result<Option<DateTime<Utc>>, DomainError> {
        let latest = self.find_latest(email, purpose).await?;
        Ok(latest.map(|r| r.created_at))
    }

    async fn invalidate_outstanding(
        &self,
        email: &str,
        purpose: VerificationPurpose,
    ) -> Result<u64, DomainError> {
        let mut records = self.records.write().await;
        let mut count = 0;

        for record in records.values_mut() {
            if record.email == email && record.purpose == purpose && record.mark_used() {
                count += 1;
            }
        }

        Ok(count)
    }

    async fn delete_expired_or_used(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut records = self.records.write().await;
        let initial_count = records.len();

        records.retain(|_, record| record.is_valid_at(now));

        Ok((initial_count - records.len()) as u64)
    }
}
