//! HTTP boundary for the email verification service
//!
//! Library exports for the binary and for tests.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::create_app;
pub use routes::AppState;
