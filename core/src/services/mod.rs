//! Business services containing domain logic and use cases.

pub mod verification;

// Re-export commonly used types
pub use verification::{
    CleanupResult, CodeCleanupService, CodeGenerator, DynVerificationService, EmailServiceTrait,
    OsRngCodeGenerator, RateLimitPolicy, SendCodeResult, VerificationService,
    VerificationServiceConfig, VerificationStatus,
};
