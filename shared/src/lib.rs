//! Shared utilities and common types for the MailCode server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types and loading
//! - Module-scoped logging with request-id propagation
//! - Error types and response structures
//! - Utility functions (email validation, masking)

pub mod config;
pub mod errors;
pub mod logging;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ConfigError, DailyWindow, DatabaseConfig, EmailVerificationConfig, Environment,
    LogFormat, LoggingConfig, ServerConfig, SmtpConfig, SmtpEncryption, StoreBackend,
};
pub use errors::{error_codes, ApiResult, ErrorResponse, IntoErrorResponse};
pub use logging::Logger;
pub use types::ApiResponse;
pub use utils::email;
