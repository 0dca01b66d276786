//! Configuration for the verification service

use mc_shared::config::{DailyWindow, EmailVerificationConfig};

use crate::domain::entities::{DEFAULT_CODE_LENGTH, DEFAULT_EXPIRATION_MINUTES};

/// Configuration for the verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Feature flag; when false every send is refused
    pub enabled: bool,
    /// Minimum seconds between sends for the same email and purpose
    pub send_interval_seconds: u64,
    /// Maximum codes per email per daily window
    pub daily_limit: u32,
    /// Number of minutes before a verification code expires
    pub code_expire_minutes: i64,
    /// Digits per code
    pub code_length: usize,
    /// How the daily window is measured
    pub daily_window: DailyWindow,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            send_interval_seconds: 60,
            daily_limit: 10,
            code_expire_minutes: DEFAULT_EXPIRATION_MINUTES,
            code_length: DEFAULT_CODE_LENGTH,
            daily_window: DailyWindow::CalendarDay,
        }
    }
}

impl From<&EmailVerificationConfig> for VerificationServiceConfig {
    fn from(config: &EmailVerificationConfig) -> Self {
        Self {
            enabled: config.enabled,
            send_interval_seconds: config.send_interval_seconds,
            daily_limit: config.daily_limit,
            code_expire_minutes: i64::from(config.code_expire_minutes),
            code_length: config.code_length,
            daily_window: config.daily_window,
        }
    }
}

impl VerificationServiceConfig {
    /// Lifetime of an issued code in seconds
    pub fn expire_seconds(&self) -> i64 {
        self.code_expire_minutes * 60
    }
}
