//! Module-scoped logging on top of `tracing`
//!
//! `Logger::module("verification")` hands out a cached logger whose events and
//! spans carry the module name and the request id of the current task.
//! `init` installs the process-wide subscriber from `LoggingConfig`.

pub mod request_id;

use once_cell::sync::{Lazy, OnceCell};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use crate::config::{LogFormat, LoggingConfig};

pub use request_id::{current_request_id, generate_request_id, with_request_id, REQUEST_ID_HEADER};

static REGISTRY: Lazy<RwLock<HashMap<String, Logger>>> = Lazy::new(|| RwLock::new(HashMap::new()));

static LEVEL: OnceCell<LevelHandle> = OnceCell::new();

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to install tracing subscriber: {0}")]
    Init(String),

    #[error("Logging has not been initialized")]
    NotInitialized,

    #[error("Failed to change log level: {0}")]
    Reload(String),
}

/// Install the global subscriber
///
/// `RUST_LOG` wins over `config.level` when set. Fails if a subscriber is
/// already installed. The level can be changed afterwards with `set_level`.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(&config.level)));
    let (filter, handle) = reloadable_filter(filter);

    let layer = fmt::layer()
        .with_ansi(config.colored)
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_target(true);
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Json => registry.with(layer.json()).try_init(),
        LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
        LogFormat::Compact => registry.with(layer.compact()).try_init(),
    };
    result.map_err(|e| LoggingError::Init(e.to_string()))?;

    let _ = LEVEL.set(handle);
    Ok(())
}

/// Change the global level at runtime
pub fn set_level(level: &str) -> Result<(), LoggingError> {
    LEVEL
        .get()
        .ok_or(LoggingError::NotInitialized)?
        .set_level(level)
}

/// Handle to the installed level filter, once `init` has run
pub fn level_handle() -> Option<LevelHandle> {
    LEVEL.get().cloned()
}

/// Map a level name to a `tracing::Level`; unknown names give INFO
pub fn parse_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn level_directive(level: &str) -> String {
    parse_level(level).as_str().to_lowercase()
}

/// Wrap `filter` so its directives can be swapped while the subscriber runs
pub fn reloadable_filter(filter: EnvFilter) -> (reload::Layer<EnvFilter, Registry>, LevelHandle) {
    let (layer, handle) = reload::Layer::new(filter);
    (layer, LevelHandle { handle })
}

/// Runtime control over a reloadable level filter
#[derive(Clone)]
pub struct LevelHandle {
    handle: reload::Handle<EnvFilter, Registry>,
}

impl LevelHandle {
    /// Replace the filter with a single global level
    pub fn set_level(&self, level: &str) -> Result<(), LoggingError> {
        let directive = level_directive(level);
        self.handle
            .reload(EnvFilter::new(&directive))
            .map_err(|e| LoggingError::Reload(e.to_string()))?;
        tracing::info!(level = %directive, "Log level changed");
        Ok(())
    }

    /// Directives of the active filter
    pub fn current(&self) -> Option<String> {
        self.handle.with_current(|filter| filter.to_string()).ok()
    }
}

impl std::fmt::Debug for LevelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelHandle")
            .field("current", &self.current())
            .finish()
    }
}

#[derive(Debug)]
struct LoggerInner {
    module: String,
    fields: Vec<(String, String)>,
    /// `key=value` pairs joined for output
    rendered: String,
}

/// Cheap-to-clone logger bound to one module name
#[derive(Debug, Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

macro_rules! emit {
    ($level:expr, $logger:expr, $msg:expr) => {{
        let request_id = current_request_id().unwrap_or_default();
        let inner = &$logger.inner;
        if inner.fields.is_empty() {
            tracing::event!(
                $level,
                module = %inner.module,
                request_id = %request_id,
                "{}",
                $msg
            );
        } else {
            tracing::event!(
                $level,
                module = %inner.module,
                request_id = %request_id,
                fields = %inner.rendered,
                "{}",
                $msg
            );
        }
    }};
}

impl Logger {
    /// Get the logger for `name`, creating and caching it on first use
    pub fn module(name: &str) -> Logger {
        {
            let registry = REGISTRY.read().unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(logger) = registry.get(name) {
                return logger.clone();
            }
        }

        let mut registry = REGISTRY.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        registry
            .entry(name.to_string())
            .or_insert_with(|| Logger::build(name.to_string(), Vec::new()))
            .clone()
    }

    fn build(module: String, fields: Vec<(String, String)>) -> Logger {
        let rendered = fields
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(" ");
        Logger {
            inner: Arc::new(LoggerInner {
                module,
                fields,
                rendered,
            }),
        }
    }

    /// Child logger that adds `fields` to every span and event
    ///
    /// A key already present on the parent takes the new value. Children are
    /// not cached.
    pub fn with_fields<I, K, V>(&self, fields: I) -> Logger
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: std::fmt::Display,
    {
        let mut merged = self.inner.fields.clone();
        for (key, value) in fields {
            let key = key.into();
            let value = value.to_string();
            match merged.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = value,
                None => merged.push((key, value)),
            }
        }
        Logger::build(self.inner.module.clone(), merged)
    }

    pub fn name(&self) -> &str {
        &self.inner.module
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.inner.fields
    }

    /// Span tagged with this module, its fields and the current request id
    pub fn span(&self) -> tracing::Span {
        let request_id = current_request_id().unwrap_or_default();
        if self.inner.fields.is_empty() {
            tracing::info_span!(
                "module",
                module = %self.inner.module,
                request_id = %request_id
            )
        } else {
            tracing::info_span!(
                "module",
                module = %self.inner.module,
                request_id = %request_id,
                fields = %self.inner.rendered
            )
        }
    }

    pub fn log(&self, level: Level, msg: impl std::fmt::Display) {
        match level {
            Level::TRACE => emit!(Level::TRACE, self, msg),
            Level::DEBUG => emit!(Level::DEBUG, self, msg),
            Level::INFO => emit!(Level::INFO, self, msg),
            Level::WARN => emit!(Level::WARN, self, msg),
            Level::ERROR => emit!(Level::ERROR, self, msg),
        }
    }

    pub fn debug(&self, msg: impl std::fmt::Display) {
        emit!(Level::DEBUG, self, msg);
    }

    pub fn info(&self, msg: impl std::fmt::Display) {
        emit!(Level::INFO, self, msg);
    }

    pub fn warn(&self, msg: impl std::fmt::Display) {
        emit!(Level::WARN, self, msg);
    }

    pub fn error(&self, msg: impl std::fmt::Display) {
        emit!(Level::ERROR, self, msg);
    }

    /// Whether two handles refer to the same cached logger
    pub fn same_as(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
