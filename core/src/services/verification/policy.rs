//! Send-rate policy: per-pair cooldown and per-email daily cap

use chrono::{DateTime, Duration, TimeZone, Utc};
use mc_shared::config::DailyWindow;

use crate::errors::VerificationError;

/// Decides whether an email may be sent a code now
///
/// Pure: callers read the store and pass the observations in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    min_interval_seconds: u64,
    daily_limit: u32,
    daily_window: DailyWindow,
}

impl RateLimitPolicy {
    pub fn new(min_interval_seconds: u64, daily_limit: u32, daily_window: DailyWindow) -> Self {
        Self {
            min_interval_seconds,
            daily_limit,
            daily_window,
        }
    }

    pub fn min_interval_seconds(&self) -> u64 {
        self.min_interval_seconds
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    /// Reject with the remaining whole seconds if the last send is too recent
    ///
    /// Partial seconds round up so a rejection never reports 0.
    pub fn check_cooldown(
        &self,
        last_send_time: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<(), VerificationError> {
        let Some(last) = last_send_time else {
            return Ok(());
        };

        let interval_ms = i64::try_from(self.min_interval_seconds)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);
        let elapsed_ms = (now - last).num_milliseconds().max(0);

        if elapsed_ms >= interval_ms {
            return Ok(());
        }

        let remaining_ms = interval_ms - elapsed_ms;
        let seconds_remaining = (remaining_ms / 1000 + i64::from(remaining_ms % 1000 != 0)) as u64;
        Err(VerificationError::TooFrequent { seconds_remaining })
    }

    /// Reject once `count` codes have already been issued in the window
    pub fn check_daily_cap(&self, count: u64) -> Result<(), VerificationError> {
        if count >= u64::from(self.daily_limit) {
            return Err(VerificationError::DailyLimitExceeded {
                limit: self.daily_limit,
            });
        }
        Ok(())
    }

    /// Start of the daily window containing `now`
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.daily_window {
            DailyWindow::CalendarDay => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|midnight| Utc.from_utc_datetime(&midnight))
                .unwrap_or(now),
            DailyWindow::Rolling24h => now - Duration::hours(24),
        }
    }
}
