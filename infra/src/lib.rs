//! # Infrastructure Layer
//!
//! Concrete implementations of the collaborators the verification service
//! depends on.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: MySQL connection pool and the verification code store using SQLx
//! - **Email**: SMTP delivery through lettre, HTML templates and a mock sender
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

// Re-export core types for convenience
pub use mc_core::errors::*;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Email module - SMTP delivery and templates
pub mod email;

/// Configuration re-exports for infrastructure services
pub mod config {
    pub use mc_shared::config::{DatabaseConfig, SmtpConfig, SmtpEncryption};
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// SMTP transport error
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Invalid sender or recipient address
    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// Message could not be assembled
    #[error("Failed to build email: {0}")]
    Message(#[from] lettre::error::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
