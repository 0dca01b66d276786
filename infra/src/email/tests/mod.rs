//! Unit tests for email module

mod mock_tests;
mod smtp_tests;
mod templates_tests;
