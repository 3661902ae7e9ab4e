//! Configuration for token protection.

use super::error::CipherError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Content-encryption algorithm for protected tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncryptionAlgorithm {
    /// AES-128 in Galois/Counter Mode
    #[serde(rename = "A128GCM")]
    A128Gcm,
    /// AES-256 in Galois/Counter Mode
    #[serde(rename = "A256GCM")]
    A256Gcm,
}

impl EncryptionAlgorithm {
    /// Required key length in bytes.
    #[must_use]
    pub const fn key_len(&self) -> usize {
        match self {
            Self::A128Gcm => 16,
            Self::A256Gcm => 32,
        }
    }

    /// Algorithm name as it appears in token headers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::A128Gcm => "A128GCM",
            Self::A256Gcm => "A256GCM",
        }
    }
}

impl FromStr for EncryptionAlgorithm {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A128GCM" => Ok(Self::A128Gcm),
            "A256GCM" => Ok(Self::A256Gcm),
            _ => Err(CipherError::configuration(format!(
                "Invalid encryption algorithm: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for EncryptionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HMAC signing algorithm for protected tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    /// HMAC with SHA-256
    HS256,
    /// HMAC with SHA-384
    HS384,
    /// HMAC with SHA-512
    HS512,
}

impl SigningAlgorithm {
    /// Minimum key length in bytes (RFC 7518 section 3.2: at least the hash size).
    #[must_use]
    pub const fn min_key_len(&self) -> usize {
        match self {
            Self::HS256 => 32,
            Self::HS384 => 48,
            Self::HS512 => 64,
        }
    }

    /// Algorithm name as it appears in token headers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
        }
    }

    /// Equivalent JWS algorithm.
    #[must_use]
    pub const fn jws(&self) -> jsonwebtoken::Algorithm {
        match self {
            Self::HS256 => jsonwebtoken::Algorithm::HS256,
            Self::HS384 => jsonwebtoken::Algorithm::HS384,
            Self::HS512 => jsonwebtoken::Algorithm::HS512,
        }
    }
}

impl FromStr for SigningAlgorithm {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HS256" => Ok(Self::HS256),
            "HS384" => Ok(Self::HS384),
            "HS512" => Ok(Self::HS512),
            _ => Err(CipherError::configuration(format!(
                "Invalid signing algorithm: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token cryptography settings as supplied by the hosting process.
///
/// Algorithms are kept as names here and parsed when a
/// [`CipherExecutor`](super::CipherExecutor) is built, so an unknown name
/// surfaces as a configuration error at startup.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CryptographyConfig {
    /// Explicit feature flag
    pub enabled: bool,
    /// Encryption key (raw or base64 encoded)
    pub encryption_key: Option<String>,
    /// Signing key (raw or base64 encoded)
    pub signing_key: Option<String>,
    /// Content-encryption algorithm name
    pub algorithm: String,
    /// HMAC algorithm name
    pub signing_algorithm: String,
    /// Encrypt tokens once protection is enabled
    pub encryption_enabled: bool,
    /// Sign tokens once protection is enabled
    pub signing_enabled: bool,
}

impl Default for CryptographyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            encryption_key: None,
            signing_key: None,
            algorithm: EncryptionAlgorithm::A256Gcm.as_str().to_string(),
            signing_algorithm: SigningAlgorithm::HS512.as_str().to_string(),
            encryption_enabled: true,
            signing_enabled: true,
        }
    }
}

impl fmt::Debug for CryptographyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("CryptographyConfig")
            .field("enabled", &self.enabled)
            .field("encryption_key", &redact(&self.encryption_key))
            .field("signing_key", &redact(&self.signing_key))
            .field("algorithm", &self.algorithm)
            .field("signing_algorithm", &self.signing_algorithm)
            .field("encryption_enabled", &self.encryption_enabled)
            .field("signing_enabled", &self.signing_enabled)
            .finish()
    }
}

impl CryptographyConfig {
    /// Create config from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a boolean toggle cannot be parsed.
    pub fn from_env() -> Result<Self, CipherError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Create config from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if a boolean toggle cannot be parsed.
    pub fn from_vars<F>(lookup: F) -> Result<Self, CipherError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup("TOKEN_CRYPTO_ENABLED") {
            config.enabled = parse_flag("TOKEN_CRYPTO_ENABLED", &val)?;
        }

        config.encryption_key = lookup("TOKEN_CRYPTO_ENCRYPTION_KEY");
        config.signing_key = lookup("TOKEN_CRYPTO_SIGNING_KEY");

        if let Some(alg) = lookup("TOKEN_CRYPTO_ALG") {
            config.algorithm = alg;
        }

        if let Some(alg) = lookup("TOKEN_CRYPTO_SIGNING_ALG") {
            config.signing_algorithm = alg;
        }

        if let Some(val) = lookup("TOKEN_CRYPTO_ENCRYPTION_ENABLED") {
            config.encryption_enabled = parse_flag("TOKEN_CRYPTO_ENCRYPTION_ENABLED", &val)?;
        }

        if let Some(val) = lookup("TOKEN_CRYPTO_SIGNING_ENABLED") {
            config.signing_enabled = parse_flag("TOKEN_CRYPTO_SIGNING_ENABLED", &val)?;
        }

        Ok(config)
    }

    /// Whether both keys carry non-whitespace material.
    #[must_use]
    pub fn has_keys(&self) -> bool {
        !is_blank(self.encryption_key.as_deref()) && !is_blank(self.signing_key.as_deref())
    }

    /// Set the feature flag.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the encryption key.
    #[must_use]
    pub fn with_encryption_key(mut self, key: impl Into<String>) -> Self {
        self.encryption_key = Some(key.into());
        self
    }

    /// Set the signing key.
    #[must_use]
    pub fn with_signing_key(mut self, key: impl Into<String>) -> Self {
        self.signing_key = Some(key.into());
        self
    }

    /// Set the content-encryption algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    /// Set the signing algorithm.
    #[must_use]
    pub fn with_signing_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.signing_algorithm = algorithm.into();
        self
    }

    /// Set encryption enabled.
    #[must_use]
    pub const fn with_encryption_enabled(mut self, enabled: bool) -> Self {
        self.encryption_enabled = enabled;
        self
    }

    /// Set signing enabled.
    #[must_use]
    pub const fn with_signing_enabled(mut self, enabled: bool) -> Self {
        self.signing_enabled = enabled;
        self
    }
}

pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn parse_flag(name: &str, value: &str) -> Result<bool, CipherError> {
    value
        .trim()
        .to_lowercase()
        .parse()
        .map_err(|e| CipherError::configuration(format!("Invalid {}: {}", name, e)))
}
