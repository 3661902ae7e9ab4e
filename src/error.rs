//! Error types for token issuance.

use crate::crypto::CipherError;
use crate::ticket::{ExpirationPolicyError, TicketValidationError};
use thiserror::Error;

/// Errors raised while issuing or parsing token tickets.
#[derive(Error, Debug)]
pub enum TokenError {
    /// Rejected by the ticket validator; passed through untouched.
    #[error(transparent)]
    TicketValidation(#[from] TicketValidationError),

    /// Expiration policy could not supply valid bounds.
    #[error(transparent)]
    ExpirationPolicy(#[from] ExpirationPolicyError),

    /// Assembled claims could not be protected.
    #[error("Token build failed: {source}")]
    Build {
        /// Underlying cipher failure
        #[source]
        source: CipherError,
    },

    /// Claims could not be encoded.
    #[error("Claims serialization failed: {0}")]
    Serialization(String),

    /// Cryptographic rejection while unprotecting a token, or unusable
    /// cryptography settings at startup.
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// Unprotected payload is not a valid claims document.
    #[error("Token parse failed: {0}")]
    Parse(String),

    /// Process configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TokenError {
    /// Wrap a cipher failure raised while minting.
    pub fn build(source: CipherError) -> Self {
        TokenError::Build { source }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        TokenError::Config(msg.into())
    }

    /// Stable code for metrics and diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::TicketValidation(e) => e.code(),
            TokenError::ExpirationPolicy(e) => e.code(),
            TokenError::Build { .. } | TokenError::Serialization(_) => TOKEN_BUILD_FAILED,
            TokenError::Cipher(e) => e.code(),
            TokenError::Parse(_) => TOKEN_PARSE_FAILED,
            TokenError::Config(_) => TOKEN_CONFIG_INVALID,
        }
    }
}

/// Code for [`TokenError::Build`] and [`TokenError::Serialization`].
pub const TOKEN_BUILD_FAILED: &str = "TOKEN_BUILD_FAILED";
/// Code for [`TokenError::Parse`].
pub const TOKEN_PARSE_FAILED: &str = "TOKEN_PARSE_FAILED";
/// Code for [`TokenError::Config`].
pub const TOKEN_CONFIG_INVALID: &str = "TOKEN_CONFIG_INVALID";
