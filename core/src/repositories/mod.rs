pub mod verification;

pub use verification::{InMemoryVerificationCodeRepository, VerificationCodeRepository};
