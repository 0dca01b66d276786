//! Type definitions shared by the HTTP layer
//!
//! - `response` - API response wrapper and health check payload

pub mod response;

pub use response::{ApiResponse, HealthResponse, HealthStatus};
