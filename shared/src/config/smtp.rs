//! SMTP relay configuration

use serde::{Deserialize, Serialize};

/// Default submission port used when none is configured
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Default display name for outgoing mail
pub const DEFAULT_FROM_NAME: &str = "Cli-Proxy";

/// Transport security used when talking to the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpEncryption {
    /// Implicit TLS, usually port 465
    Ssl,
    /// Plain connection upgraded with STARTTLS, usually port 587
    Starttls,
    /// No transport security
    None,
}

impl SmtpEncryption {
    /// Parse an encryption mode, falling back to STARTTLS for unknown values
    ///
    /// Unknown values are logged at warn level rather than rejected so a typo in
    /// the settings does not silently disable transport security.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "ssl" => SmtpEncryption::Ssl,
            "starttls" => SmtpEncryption::Starttls,
            "none" => SmtpEncryption::None,
            other => {
                tracing::warn!(
                    encryption = other,
                    "Unknown SMTP encryption mode, using STARTTLS"
                );
                SmtpEncryption::Starttls
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SmtpEncryption::Ssl => "ssl",
            SmtpEncryption::Starttls => "starttls",
            SmtpEncryption::None => "none",
        }
    }
}

/// SMTP relay settings consumed by the email service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmtpConfig {
    /// Relay host name; empty means "not configured"
    #[serde(default)]
    pub host: String,

    /// Relay port, 0 falls back to 587
    #[serde(default = "default_port")]
    pub port: u16,

    /// Authentication user name, empty disables authentication
    #[serde(default)]
    pub username: String,

    /// Authentication password
    #[serde(default)]
    pub password: String,

    /// Envelope and header sender address; empty means "not configured"
    #[serde(default)]
    pub from_email: String,

    /// Sender display name
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Raw encryption mode (`ssl`, `starttls`, `none`)
    #[serde(default = "default_encryption")]
    pub encryption: String,

    /// Timeout for a single delivery in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            username: String::new(),
            password: String::new(),
            from_email: String::new(),
            from_name: default_from_name(),
            encryption: default_encryption(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SmtpConfig {
    /// Create from `SMTP_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("SMTP_HOST").unwrap_or_default(),
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
            password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_email: std::env::var("SMTP_FROM_EMAIL").unwrap_or_default(),
            from_name: std::env::var("SMTP_FROM_NAME").unwrap_or(defaults.from_name),
            encryption: std::env::var("SMTP_ENCRYPTION").unwrap_or(defaults.encryption),
            timeout_secs: std::env::var("SMTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }

    /// Whether enough is set to attempt delivery (host and sender address)
    pub fn is_configured(&self) -> bool {
        !self.host.trim().is_empty() && !self.from_email.trim().is_empty()
    }

    /// Port to connect to, applying the 587 default for 0
    pub fn effective_port(&self) -> u16 {
        if self.port == 0 {
            DEFAULT_SMTP_PORT
        } else {
            self.port
        }
    }

    /// Display name to use, applying the default for blank values
    pub fn effective_from_name(&self) -> &str {
        if self.from_name.trim().is_empty() {
            DEFAULT_FROM_NAME
        } else {
            &self.from_name
        }
    }

    /// Parsed encryption mode; logs a warning for unknown values on each call
    pub fn encryption_mode(&self) -> SmtpEncryption {
        SmtpEncryption::parse_lenient(&self.encryption)
    }
}

fn default_port() -> u16 {
    DEFAULT_SMTP_PORT
}

fn default_from_name() -> String {
    DEFAULT_FROM_NAME.to_string()
}

fn default_encryption() -> String {
    "starttls".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
