//! # MailCode Core
//!
//! Core business logic and domain layer for email verification codes.
//! This crate contains the verification record entity, the code store
//! interface with an in-memory implementation, the rate-limit policy, code
//! generation, and the verification service that ties them together.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
