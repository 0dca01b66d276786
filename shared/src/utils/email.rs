//! Email address utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest address accepted (RFC 5321 path limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

// Pragmatic address check: local part, one @, dotted domain with a 2+ letter TLD
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
        .expect("email regex is valid")
});

/// Normalize an email address for storage and lookup (trim + lowercase)
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check if an email address is syntactically valid after normalization
pub fn is_valid_email(email: &str) -> bool {
    let normalized = normalize_email(email);
    !normalized.is_empty()
        && normalized.len() <= MAX_EMAIL_LENGTH
        && EMAIL_REGEX.is_match(&normalized)
}

/// Mask an email address for logs (e.g., j***n@example.com)
pub fn mask_email(email: &str) -> String {
    let normalized = normalize_email(email);
    match normalized.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let chars: Vec<char> = local.chars().collect();
            let masked_local = match chars.len() {
                1 => "*".to_string(),
                2 => format!("{}*", chars[0]),
                n => format!("{}***{}", chars[0], chars[n - 1]),
            };
            format!("{}@{}", masked_local, domain)
        }
        _ => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  User@Example.COM "), "user@example.com");
        assert_eq!(normalize_email("a@b.io"), "a@b.io");
    }

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co"));
        assert!(is_valid_email(" Mixed@Case.Org "));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@-example.com"));
    }

    #[test]
    fn test_overlong_email_rejected() {
        let local = "a".repeat(250);
        assert!(!is_valid_email(&format!("{}@example.com", local)));
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("john@example.com"), "j***n@example.com");
        assert_eq!(mask_email("ab@example.com"), "a*@example.com");
        assert_eq!(mask_email("a@example.com"), "*@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
