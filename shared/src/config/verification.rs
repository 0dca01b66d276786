//! Email verification policy configuration

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// How the daily send cap window is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DailyWindow {
    /// From UTC midnight of the current day
    #[default]
    CalendarDay,
    /// The 24 hours before now
    Rolling24h,
}

/// Email verification code settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailVerificationConfig {
    /// Whether email verification is offered at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Minimum seconds between two sends to the same email and purpose
    #[serde(default = "default_send_interval_seconds")]
    pub send_interval_seconds: u64,

    /// Maximum codes issued to one email per daily window
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,

    /// Minutes a code stays valid
    #[serde(default = "default_code_expire_minutes")]
    pub code_expire_minutes: u32,

    /// Number of digits in a code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Daily cap window semantics
    #[serde(default)]
    pub daily_window: DailyWindow,

    /// Background sweep of expired and used codes
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

impl Default for EmailVerificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            send_interval_seconds: default_send_interval_seconds(),
            daily_limit: default_daily_limit(),
            code_expire_minutes: default_code_expire_minutes(),
            code_length: default_code_length(),
            daily_window: DailyWindow::default(),
            cleanup: CleanupConfig::default(),
        }
    }
}

impl EmailVerificationConfig {
    /// Create from `EMAIL_VERIFICATION_*` environment variables
    pub fn from_env() -> Self {
        fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
            std::env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        let defaults = Self::default();
        let daily_window = match std::env::var("EMAIL_VERIFICATION_DAILY_WINDOW").as_deref() {
            Ok("rolling_24h") => DailyWindow::Rolling24h,
            _ => defaults.daily_window,
        };

        Self {
            enabled: parsed("EMAIL_VERIFICATION_ENABLED", defaults.enabled),
            send_interval_seconds: parsed(
                "EMAIL_VERIFICATION_SEND_INTERVAL",
                defaults.send_interval_seconds,
            ),
            daily_limit: parsed("EMAIL_VERIFICATION_DAILY_LIMIT", defaults.daily_limit),
            code_expire_minutes: parsed(
                "EMAIL_VERIFICATION_EXPIRE_MINUTES",
                defaults.code_expire_minutes,
            ),
            code_length: parsed("EMAIL_VERIFICATION_CODE_LENGTH", defaults.code_length),
            daily_window,
            cleanup: CleanupConfig {
                interval_seconds: parsed(
                    "EMAIL_VERIFICATION_CLEANUP_INTERVAL",
                    defaults.cleanup.interval_seconds,
                ),
                ..defaults.cleanup
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.code_length == 0 || self.code_length > 16 {
            return Err(ConfigError::Invalid {
                field: "verification.code_length".to_string(),
                message: format!("must be between 1 and 16, got {}", self.code_length),
            });
        }
        if self.code_expire_minutes == 0 {
            return Err(ConfigError::Invalid {
                field: "verification.code_expire_minutes".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.cleanup.enabled && self.cleanup.interval_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "verification.cleanup.interval_seconds".to_string(),
                message: "must be positive when cleanup is enabled".to_string(),
            });
        }
        Ok(())
    }
}

/// Periodic cleanup of expired and used verification records
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CleanupConfig {
    /// Whether to run the background sweep
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seconds between sweeps
    #[serde(default = "default_cleanup_interval")]
    pub interval_seconds: u64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_seconds: default_cleanup_interval(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_send_interval_seconds() -> u64 {
    60
}

fn default_daily_limit() -> u32 {
    10
}

fn default_code_expire_minutes() -> u32 {
    10
}

fn default_code_length() -> usize {
    6
}

fn default_cleanup_interval() -> u64 {
    3600 // hourly
}
