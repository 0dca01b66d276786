//! Email verification record issued for registration and password reset.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Length of a verification code unless configured otherwise
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Default lifetime of a verification code (10 minutes)
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 10;

/// What a verification code authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationPurpose {
    /// New account registration
    Register,
    /// Password reset for an existing account
    ResetPassword,
}

impl VerificationPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationPurpose::Register => "register",
            VerificationPurpose::ResetPassword => "reset_password",
        }
    }
}

impl fmt::Display for VerificationPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "register" => Ok(VerificationPurpose::Register),
            "reset_password" => Ok(VerificationPurpose::ResetPassword),
            other => Err(format!("Invalid verification purpose: {}", other)),
        }
    }
}

/// A single issued verification code
///
/// Records are immutable apart from `used`, which only ever goes from
/// `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailVerification {
    /// Unique identifier for the record
    pub id: Uuid,

    /// Normalized (trimmed, lowercased) recipient address
    pub email: String,

    /// The numeric code; never serialized into API output
    #[serde(skip_serializing, default)]
    pub code: String,

    /// What the code may be used for
    pub purpose: VerificationPurpose,

    /// Absolute expiry instant
    pub expires_at: DateTime<Utc>,

    /// Whether the code has been consumed or invalidated
    pub used: bool,

    /// When the code was issued
    pub created_at: DateTime<Utc>,
}

impl EmailVerification {
    /// Create a fresh, unused record issued at `now`
    pub fn new(
        email: impl Into<String>,
        code: impl Into<String>,
        purpose: VerificationPurpose,
        now: DateTime<Utc>,
        expire_minutes: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            code: code.into(),
            purpose,
            expires_at: now + Duration::minutes(expire_minutes),
            used: false,
            created_at: now,
        }
    }

    /// Whether the code is past its expiry at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// A record is valid iff it is unused and `now < expires_at`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.used && !self.is_expired_at(now)
    }

    /// Whether this record is the one a verify call for these inputs may consume
    pub fn matches(&self, email: &str, code: &str, purpose: VerificationPurpose) -> bool {
        self.email == email && self.purpose == purpose && self.code == code
    }

    /// Mark as used; returns whether this call changed the flag
    pub fn mark_used(&mut self) -> bool {
        if self.used {
            false
        } else {
            self.used = true;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_at(now: DateTime<Utc>) -> EmailVerification {
        EmailVerification::new("user@example.com", "123456", VerificationPurpose::Register, now, 10)
    }

    #[test]
    fn test_purpose_parsing() {
        assert_eq!(
            "register".parse::<VerificationPurpose>().unwrap(),
            VerificationPurpose::Register
        );
        assert_eq!(
            "reset_password".parse::<VerificationPurpose>().unwrap(),
            VerificationPurpose::ResetPassword
        );
        assert!("login".parse::<VerificationPurpose>().is_err());
        assert!("Register".parse::<VerificationPurpose>().is_err());
    }

    #[test]
    fn test_purpose_serde_names() {
        let json = serde_json::to_string(&VerificationPurpose::ResetPassword).unwrap();
        assert_eq!(json, "\"reset_password\"");
        assert_eq!(VerificationPurpose::Register.to_string(), "register");
    }

    #[test]
    fn test_validity_window() {
        let now = Utc::now();
        let record = record_at(now);

        assert_eq!(record.expires_at, now + Duration::minutes(10));
        assert!(record.is_valid_at(now));
        assert!(record.is_valid_at(now + Duration::minutes(10) - Duration::seconds(1)));
        assert!(!record.is_valid_at(now + Duration::minutes(10)));
    }

    #[test]
    fn test_mark_used_is_monotonic() {
        let mut record = record_at(Utc::now());
        assert!(record.mark_used());
        assert!(!record.mark_used());
        assert!(record.used);
        assert!(!record.is_valid_at(record.created_at));
    }

    #[test]
    fn test_code_is_not_serialized() {
        let record = record_at(Utc::now());
        let json = serde_json::to_value(&record).unwrap();

        assert!(json.get("code").is_none());
        assert_eq!(json["purpose"], "register");
        assert_eq!(json["email"], "user@example.com");
    }

    #[test]
    fn test_matches_requires_all_fields() {
        let record = record_at(Utc::now());
        assert!(record.matches("user@example.com", "123456", VerificationPurpose::Register));
        assert!(!record.matches("user@example.com", "123456", VerificationPurpose::ResetPassword));
        assert!(!record.matches("user@example.com", "654321", VerificationPurpose::Register));
        assert!(!record.matches("other@example.com", "123456", VerificationPurpose::Register));
    }
}
