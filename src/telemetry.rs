//! Tracing subscriber setup for processes embedding the token builder.
//!
//! A bare level such as `debug` applies to this crate only; dependencies stay
//! at `warn`. Anything containing `=` or `,` is taken as a complete filter.
//! `RUST_LOG`, when set and valid, overrides both.

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CRATE_TARGET: &str = "token_ticket";
const DEPENDENCY_LEVEL: &str = "warn";

/// Logging settings, read from `LOG_LEVEL` and `LOG_JSON`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for this crate, or a full filter directive
    pub log_level: String,
    /// Emit one JSON object per event
    pub json_output: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_output: false,
        }
    }
}

impl TracingConfig {
    /// Set the level or filter directive.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Switch to JSON output.
    #[must_use]
    pub const fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }

    /// Filter directives this configuration stands for.
    #[must_use]
    pub fn filter_directives(&self) -> String {
        let level = self.log_level.trim();
        if level.contains('=') || level.contains(',') {
            level.to_string()
        } else {
            format!("{DEPENDENCY_LEVEL},{CRATE_TARGET}={level}")
        }
    }

    fn filter(&self) -> Result<EnvFilter, TelemetryError> {
        Ok(EnvFilter::try_new(self.filter_directives())?)
    }
}

/// Errors raised while installing the subscriber.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Configured level or directive does not parse.
    #[error("Invalid log filter: {0}")]
    InvalidFilter(#[from] ParseError),

    /// A global subscriber is already in place.
    #[error("Tracing already initialized: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Install the global tracing subscriber.
///
/// Call once at startup, before building the
/// [`CipherExecutor`](crate::crypto::CipherExecutor) so its startup notices
/// are captured.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] if the configured level does not
/// parse, and [`TelemetryError::AlreadyInitialized`] on a second call.
pub fn init_tracing(config: &TracingConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => config.filter()?,
    };

    let json = config.json_output.then(|| fmt::layer().json());
    let text = (!config.json_output).then(fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .try_init()?;
    Ok(())
}
