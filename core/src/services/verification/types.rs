//! Types for verification service results

use serde::{Deserialize, Serialize};

/// Result of sending a verification code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendCodeResult {
    /// Seconds until the issued code expires
    pub expire_seconds: i64,
}

/// Public view of the verification feature state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStatus {
    pub enabled: bool,
    pub send_interval_seconds: u64,
    /// Whether the email dispatcher has enough settings to send
    pub configured: bool,
}
