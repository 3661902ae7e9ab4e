//! Error types for token protection.

use thiserror::Error;

/// Errors raised while configuring or applying token protection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// Resolved mode requires key material that is absent or malformed.
    /// Raised at construction time only.
    #[error("Cryptography configuration error: {0}")]
    Configuration(String),

    /// Signature did not match the protected content.
    #[error("Cryptographic verification failed: {0}")]
    Verification(String),

    /// Token could not be decrypted or is not an envelope this executor accepts.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Payload could not be protected.
    #[error("Encryption failed: {0}")]
    Encryption(String),
}

impl CipherError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        CipherError::Configuration(msg.into())
    }

    /// Create a verification error.
    #[must_use]
    pub fn verification(msg: impl Into<String>) -> Self {
        CipherError::Verification(msg.into())
    }

    /// Create a decryption error.
    #[must_use]
    pub fn decryption(msg: impl Into<String>) -> Self {
        CipherError::Decryption(msg.into())
    }

    /// Create an encryption error.
    #[must_use]
    pub fn encryption(msg: impl Into<String>) -> Self {
        CipherError::Encryption(msg.into())
    }

    /// Stable code for metrics and diagnostics.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            CipherError::Configuration(_) => CRYPTO_CONFIGURATION_INVALID,
            CipherError::Verification(_) => CRYPTO_VERIFICATION_FAILED,
            CipherError::Decryption(_) => CRYPTO_DECRYPTION_FAILED,
            CipherError::Encryption(_) => CRYPTO_ENCRYPTION_FAILED,
        }
    }
}

// Error codes

/// Code for [`CipherError::Configuration`].
pub const CRYPTO_CONFIGURATION_INVALID: &str = "CRYPTO_CONFIGURATION_INVALID";
/// Code for [`CipherError::Verification`].
pub const CRYPTO_VERIFICATION_FAILED: &str = "CRYPTO_VERIFICATION_FAILED";
/// Code for [`CipherError::Decryption`].
pub const CRYPTO_DECRYPTION_FAILED: &str = "CRYPTO_DECRYPTION_FAILED";
/// Code for [`CipherError::Encryption`].
pub const CRYPTO_ENCRYPTION_FAILED: &str = "CRYPTO_ENCRYPTION_FAILED";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CipherError::decryption("unable to decrypt token");
        assert_eq!(err.to_string(), "Decryption failed: unable to decrypt token");

        let err = CipherError::configuration("signing key is required");
        assert_eq!(
            err.to_string(),
            "Cryptography configuration error: signing key is required"
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CipherError::verification("x").code(), CRYPTO_VERIFICATION_FAILED);
        assert_eq!(CipherError::decryption("x").code(), CRYPTO_DECRYPTION_FAILED);
        assert_eq!(CipherError::encryption("x").code(), CRYPTO_ENCRYPTION_FAILED);
        assert_eq!(CipherError::configuration("x").code(), CRYPTO_CONFIGURATION_INVALID);
    }
}
