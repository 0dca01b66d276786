//! Unit tests for code generation

use std::collections::HashSet;

use crate::errors::VerificationError;
use crate::services::verification::{CodeGenerator, FixedCodeGenerator, OsRngCodeGenerator};

#[test]
fn test_generates_exact_length_digits() {
    let generator = OsRngCodeGenerator;
    for length in [1, 4, 6, 10, 16, 40] {
        let code = generator.generate(length).unwrap();
        assert_eq!(code.len(), length);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}

#[test]
fn test_zero_length_is_rejected() {
    assert!(matches!(
        OsRngCodeGenerator.generate(0),
        Err(VerificationError::ValidationFailed { .. })
    ));
    assert!(FixedCodeGenerator::new("1").generate(0).is_err());
}

#[test]
fn test_codes_vary() {
    let codes: HashSet<String> = (0..100)
        .map(|_| OsRngCodeGenerator.generate(6).unwrap())
        .collect();
    assert!(codes.len() > 90);
}

#[test]
fn test_digit_distribution_is_not_biased() {
    // 6000 codes * 6 digits: each position should see each digit ~600 times
    let samples = 6000;
    let mut counts = [[0u32; 10]; 6];

    for _ in 0..samples {
        let code = OsRngCodeGenerator.generate(6).unwrap();
        for (position, digit) in code.bytes().enumerate() {
            counts[position][(digit - b'0') as usize] += 1;
        }
    }

    for position in counts.iter() {
        for &count in position.iter() {
            assert!(
                (450..=750).contains(&count),
                "digit frequency {} outside expected range",
                count
            );
        }
    }
}

#[test]
fn test_fixed_generator() {
    let generator = FixedCodeGenerator::new("123456");
    assert_eq!(generator.generate(6).unwrap(), "123456");
}
