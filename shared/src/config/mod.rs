//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server configuration
//! - `smtp` - Outgoing mail relay settings
//! - `verification` - Email verification code policy (cooldown, daily cap, expiry)
//!
//! Values are layered: built-in defaults for the detected environment, then an
//! optional TOML file, then `APP__`-prefixed environment variables.

pub mod database;
pub mod environment;
pub mod server;
pub mod smtp;
pub mod verification;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export commonly used types
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::ServerConfig;
pub use smtp::{SmtpConfig, SmtpEncryption};
pub use verification::{CleanupConfig, DailyWindow, EmailVerificationConfig};

/// Prefix for environment variable overrides (`APP__SMTP__HOST=...`)
pub const ENV_PREFIX: &str = "APP";

/// Errors raised while assembling the application configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration value for {field}: {message}")]
    Invalid { field: String, message: String },
}

/// Which CodeStore implementation backs the verification service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// MySQL through sqlx
    #[default]
    Mysql,
    /// Process-local store, development only
    Memory,
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Verification code store backend
    #[serde(default)]
    pub store: StoreBackend,

    /// Email verification policy
    #[serde(default)]
    pub verification: EmailVerificationConfig,

    /// SMTP relay configuration
    #[serde(default)]
    pub smtp: SmtpConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl AppConfig {
    /// Baseline configuration for an environment before any file or env overrides
    pub fn for_environment(environment: Environment) -> Self {
        let store = if environment.is_development() {
            StoreBackend::Memory
        } else {
            StoreBackend::Mysql
        };

        Self {
            environment,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            store,
            verification: EmailVerificationConfig::default(),
            smtp: SmtpConfig::default(),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Load configuration from defaults, the environment's TOML file and env vars
    ///
    /// A `.env` file is loaded first if present. The TOML file is optional.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = Environment::from_env();
        let defaults = Self::for_environment(environment);

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&defaults)?)
            .add_source(config::File::with_name(environment.config_file()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: Self = settings.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Load configuration from flat environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = Environment::from_env();
        let mut config = Self::for_environment(environment);
        config.server = ServerConfig::from_env();
        config.database = DatabaseConfig::from_env();
        config.verification = EmailVerificationConfig::from_env();
        config.smtp = SmtpConfig::from_env();
        if let Ok(store) = std::env::var("VERIFICATION_STORE") {
            config.store = match store.to_lowercase().as_str() {
                "memory" => StoreBackend::Memory,
                "mysql" => StoreBackend::Mysql,
                other => {
                    return Err(ConfigError::Invalid {
                        field: "VERIFICATION_STORE".to_string(),
                        message: format!("unknown store backend '{}'", other),
                    })
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the verification policy or the selected store cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.verification.validate()?;
        if self.store == StoreBackend::Mysql {
            self.database.validate()?;
        }
        Ok(())
    }
}
