//! Process configuration for token issuance.
//!
//! Loaded from environment variables (and a `.env` file when present) and
//! validated at startup.

use crate::crypto::CryptographyConfig;
use crate::error::TokenError;
use crate::telemetry::TracingConfig;
use std::env;
use std::time::Duration;

/// Token issuance configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server prefix, used as the token issuer
    pub server_prefix: String,
    /// Lifetime granted to issued tickets
    pub ticket_ttl: Duration,
    /// Token cryptography
    pub crypto: CryptographyConfig,
    /// Logging
    pub tracing: TracingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_env() -> Result<Self, TokenError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_vars<F>(lookup: F) -> Result<Self, TokenError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_prefix = lookup("SERVER_PREFIX")
            .unwrap_or_else(|| "https://localhost:8443/cas".to_string());
        if server_prefix.trim().is_empty() {
            return Err(TokenError::config("SERVER_PREFIX must not be blank"));
        }

        let ticket_ttl = Duration::from_secs(parse_var(&lookup, "TICKET_TTL", 28_800)?);
        if ticket_ttl.is_zero() {
            return Err(TokenError::config("TICKET_TTL must be greater than 0"));
        }

        let crypto = CryptographyConfig::from_vars(&lookup)?;

        let mut tracing = TracingConfig::default()
            .with_log_level(lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()));
        if parse_var(&lookup, "LOG_JSON", false)? {
            tracing = tracing.with_json_output();
        }

        Ok(Self {
            server_prefix,
            ticket_ttl,
            crypto,
            tracing,
        })
    }
}

/// Parse variable with default value.
fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, TokenError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| TokenError::config(format!("Invalid {}: {}", name, e))),
        None => Ok(default),
    }
}
