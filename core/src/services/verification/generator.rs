//! Numeric verification code generation

use rand::rngs::OsRng;
use rand::RngCore;

use crate::errors::VerificationError;

// Largest multiple of 10 that fits in a byte; bytes at or above it are redrawn
const UNBIASED_BYTE_LIMIT: u8 = 250;

/// Produces fixed-length numeric codes
pub trait CodeGenerator: Send + Sync {
    fn generate(&self, length: usize) -> Result<String, VerificationError>;
}

/// Draws every digit independently from the operating system CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRngCodeGenerator;

impl CodeGenerator for OsRngCodeGenerator {
    fn generate(&self, length: usize) -> Result<String, VerificationError> {
        if length == 0 {
            return Err(VerificationError::validation(
                "code_length",
                "must be at least 1",
            ));
        }

        let mut rng = OsRng;
        let mut code = String::with_capacity(length);
        let mut buf = [0u8; 16];

        while code.len() < length {
            rng.try_fill_bytes(&mut buf)
                .map_err(|e| VerificationError::GenerationFailure(e.to_string()))?;

            for byte in buf.iter().copied().filter(|b| *b < UNBIASED_BYTE_LIMIT) {
                if code.len() == length {
                    break;
                }
                code.push(char::from(b'0' + byte % 10));
            }
        }

        Ok(code)
    }
}

/// Always returns the same code; for tests and local demos
#[derive(Debug, Clone)]
pub struct FixedCodeGenerator {
    code: String,
}

impl FixedCodeGenerator {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

impl CodeGenerator for FixedCodeGenerator {
    fn generate(&self, length: usize) -> Result<String, VerificationError> {
        if length == 0 {
            return Err(VerificationError::validation(
                "code_length",
                "must be at least 1",
            ));
        }
        Ok(self.code.clone())
    }
}
