//! Unit tests for email templates

use crate::email::templates::{configuration_test, escape_html, verification_code};

#[test]
fn test_verification_code_content() {
    let content = verification_code("Cli-Proxy", "482913", 10);

    assert_eq!(content.subject, "Cli-Proxy verification code");
    assert!(content.html.contains("482913"));
    assert!(content.html.contains("10 minutes"));
    assert!(content.html.starts_with("<!DOCTYPE html>"));
    assert!(content.text.contains("482913"));
    assert!(content.text.contains("10 minutes"));
}

#[test]
fn test_configuration_test_content() {
    let content = configuration_test("Acme Mail");

    assert_eq!(content.subject, "Acme Mail email configuration test");
    assert!(content.html.contains("Email is configured"));
    assert!(content.html.contains("sent automatically by Acme Mail"));
    assert!(!content.text.is_empty());
}

#[test]
fn test_from_name_is_escaped_in_html() {
    let content = verification_code("<Ops & Co>", "123456", 5);

    assert!(content.html.contains("&lt;Ops &amp; Co&gt;"));
    assert!(!content.html.contains("<Ops & Co>"));
    // Subject and text are not HTML
    assert_eq!(content.subject, "<Ops & Co> verification code");
}

#[test]
fn test_escape_html() {
    assert_eq!(escape_html("plain"), "plain");
    assert_eq!(escape_html(r#"a"b'c"#), "a&quot;b&#39;c");
}
