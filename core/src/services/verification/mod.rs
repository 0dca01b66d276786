//! Verification service module for email-based verification codes
//!
//! This module provides the complete code workflow:
//! - Cooldown and daily cap checks before anything is written
//! - Invalidation of outstanding codes, generation, persistence and dispatch
//! - Single-use verification of submitted codes
//! - Periodic cleanup of expired and used records

mod cleanup;
mod config;
mod generator;
mod locks;
mod policy;
mod service;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, CodeCleanupService};
pub use config::VerificationServiceConfig;
pub use generator::{CodeGenerator, FixedCodeGenerator, OsRngCodeGenerator};
pub use policy::RateLimitPolicy;
pub use service::{DynVerificationService, VerificationService};
pub use traits::{
    Clock, DiagnosticSink, EmailServiceTrait, ManualClock, NonFatalEvent, SystemClock,
    TracingDiagnostics,
};
pub use types::{SendCodeResult, VerificationStatus};
