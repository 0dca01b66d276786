//! MySQL implementation of the VerificationCodeRepository trait.
//!
//! Records live in the `email_verifications` table. Ids are stored as
//! hyphenated UUID strings and timestamps as `DATETIME(6)` in UTC.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use mc_core::domain::entities::{EmailVerification, VerificationPurpose};
use mc_core::errors::DomainError;
use mc_core::repositories::VerificationCodeRepository;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS email_verifications (
        id CHAR(36) NOT NULL PRIMARY KEY,
        email VARCHAR(255) NOT NULL,
        code VARCHAR(16) NOT NULL,
        purpose VARCHAR(20) NOT NULL,
        expires_at DATETIME(6) NOT NULL,
        used BOOLEAN NOT NULL DEFAULT FALSE,
        created_at DATETIME(6) NOT NULL,
        INDEX idx_email_verifications_email (email),
        INDEX idx_email_verifications_lookup (email, purpose, created_at)
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
"#;

const SELECT_COLUMNS: &str = "id, email, code, purpose, expires_at, used, created_at";

/// MySQL implementation of VerificationCodeRepository
pub struct MySqlVerificationCodeRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlVerificationCodeRepository {
    /// Create a new MySQL verification code repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Create the `email_verifications` table and its indexes if missing
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| internal("Failed to create email_verifications table", e))?;

        tracing::info!(table = "email_verifications", "Verification code schema ready");
        Ok(())
    }

    /// Convert database row to EmailVerification entity
    fn row_to_record(row: &sqlx::mysql::MySqlRow) -> Result<EmailVerification, DomainError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| internal("Failed to get id", e))?;
        let purpose: String = row
            .try_get("purpose")
            .map_err(|e| internal("Failed to get purpose", e))?;

        Ok(EmailVerification {
            id: Uuid::parse_str(&id).map_err(|e| internal("Invalid verification UUID", e))?,
            email: row
                .try_get("email")
                .map_err(|e| internal("Failed to get email", e))?,
            code: row
                .try_get("code")
                .map_err(|e| internal("Failed to get code", e))?,
            purpose: purpose
                .parse::<VerificationPurpose>()
                .map_err(|message| DomainError::Internal { message })?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| internal("Failed to get expires_at", e))?,
            used: row
                .try_get("used")
                .map_err(|e| internal("Failed to get used", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| internal("Failed to get created_at", e))?,
        })
    }
}

fn internal(context: &str, error: impl std::fmt::Display) -> DomainError {
    DomainError::Internal {
        message: format!("{}: {}", context, error),
    }
}

#[async_trait]
impl VerificationCodeRepository for MySqlVerificationCodeRepository {
    async fn create(&self, record: EmailVerification) -> Result<Uuid, DomainError> {
        let query = r#"
            INSERT INTO email_verifications (
                id, email, code, purpose, expires_at, used, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(record.id.to_string())
            .bind(&record.email)
            .bind(&record.code)
            .bind(record.purpose.as_str())
            .bind(record.expires_at)
            .bind(record.used)
            .bind(record.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| internal("Failed to save verification code", e))?;

        Ok(record.id)
    }

    async fn find_latest(
        &self,
        email: &str,
        purpose: VerificationPurpose,
    ) -> Result<Option<EmailVerification>, DomainError> {
        let query = format!(
            "SELECT {} FROM email_verifications \
             WHERE email = ? AND purpose = ? \
             ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS
        );

        let result = sqlx::query(&query)
            .bind(email)
            .bind(purpose.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| internal("Failed to find latest verification", e))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_valid(
        &self,
        email: &str,
        code: &str,
        purpose: VerificationPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<EmailVerification>, DomainError> {
        let query = format!(
            "SELECT {} FROM email_verifications \
             WHERE email = ? AND code = ? AND purpose = ? \
                AND used = FALSE AND expires_at > ? \
             ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS
        );

        let result = sqlx::query(&query)
            .bind(email)
            .bind(code)
            .bind(purpose.as_str())
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| internal("Failed to find valid verification", e))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn mark_used(&self, id: Uuid) -> Result<bool, DomainError> {
        // The used = FALSE guard makes the transition happen at most once
        let query = r#"
            UPDATE email_verifications
            SET used = TRUE
            WHERE id = ? AND used = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| internal("Failed to mark verification used", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_since(
        &self,
        email: &str,
        window_start: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let query = r#"
            SELECT COUNT(*) AS count
            FROM email_verifications
            WHERE email = ? AND created_at >= ?
        "#;

        let row = sqlx::query(query)
            .bind(email)
            .bind(window_start)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| internal("Failed to count verifications", e))?;

        let count: i64 = row
            .try_get("count")
            .map_err(|e| internal("Failed to get count", e))?;

        Ok(count.max(0) as u64)
    }

    async fn last_send_time(
        &self,
        email: &str,
        purpose: VerificationPurpose,
    ) -> Result<Option<DateTime<Utc>>, DomainError> {
        let query = r#"
            SELECT created_at
            FROM email_verifications
            WHERE email = ? AND purpose = ?
            ORDER BY created_at DESC
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(email)
            .bind(purpose.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| internal("Failed to find last send time", e))?;

        result
            .map(|row| {
                row.try_get::<DateTime<Utc>, _>("created_at")
                    .map_err(|e| internal("Failed to get created_at", e))
            })
            .transpose()
    }

    async fn invalidate_outstanding(
        &self,
        email: &str,
        purpose: VerificationPurpose,
    ) -> Result<u64, DomainError> {
        let query = r#"
            UPDATE email_verifications
            SET used = TRUE
            WHERE email = ? AND purpose = ? AND used = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(email)
            .bind(purpose.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| internal("Failed to invalidate outstanding codes", e))?;

        Ok(result.rows_affected())
    }

    async fn delete_expired_or_used(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let query = r#"
            DELETE FROM email_verifications
            WHERE used = TRUE OR expires_at <= ?
        "#;

        let result = sqlx::query(query)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| internal("Failed to delete expired verifications", e))?;

        tracing::debug!(
            deleted = result.rows_affected(),
            "Deleted expired or used verification codes"
        );

        Ok(result.rows_affected())
    }
}
