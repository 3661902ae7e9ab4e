//! Resolution of the effective protection mode.
//!
//! [`resolve`] is pure: it returns the decision together with the operational
//! notices it implies and leaves emitting them to the caller.

use super::config::CryptographyConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Effective protection applied to issued tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CryptoMode {
    /// Tokens are encoded but neither signed nor encrypted
    #[serde(rename = "none")]
    Disabled,
    /// Tokens are encrypted only
    #[serde(rename = "enc")]
    EncryptOnly,
    /// Tokens are signed only; the payload stays readable
    #[serde(rename = "sig")]
    SignOnly,
    /// Tokens are signed, then the signed bundle is encrypted
    #[serde(rename = "sig+enc")]
    EncryptAndSign,
}

impl CryptoMode {
    /// Mode for a pair of sub-toggles.
    #[must_use]
    pub const fn from_toggles(encrypt: bool, sign: bool) -> Self {
        match (encrypt, sign) {
            (true, true) => Self::EncryptAndSign,
            (true, false) => Self::EncryptOnly,
            (false, true) => Self::SignOnly,
            (false, false) => Self::Disabled,
        }
    }

    /// Whether tokens are encrypted in this mode.
    #[must_use]
    pub const fn encrypts(&self) -> bool {
        matches!(self, Self::EncryptOnly | Self::EncryptAndSign)
    }

    /// Whether tokens are signed in this mode.
    #[must_use]
    pub const fn signs(&self) -> bool {
        matches!(self, Self::SignOnly | Self::EncryptAndSign)
    }

    /// Short label used in headers, logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "none",
            Self::EncryptOnly => "enc",
            Self::SignOnly => "sig",
            Self::EncryptAndSign => "sig+enc",
        }
    }
}

impl fmt::Display for CryptoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operational notice produced while resolving the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Keys were supplied without the feature flag; protection was switched on.
    AutoEnabled,
    /// Protection is enabled but both sub-toggles are off.
    NothingProtected,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::AutoEnabled => f.write_str(
                "Token encryption/signing is not enabled explicitly in the configuration, \
                 yet signing/encryption keys are defined. Token encryption/signing will be enabled.",
            ),
            Notice::NothingProtected => f.write_str(
                "Token cryptography is enabled but both encryption and signing are turned off; \
                 tokens will be issued without protection.",
            ),
        }
    }
}

/// Outcome of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Effective mode
    pub mode: CryptoMode,
    /// Notices the caller is expected to emit
    pub notices: Vec<Notice>,
}

/// Resolve the effective protection mode for a configuration.
#[must_use]
pub fn resolve(config: &CryptographyConfig) -> Resolution {
    let mut notices = Vec::new();

    let enabled = if !config.enabled && config.has_keys() {
        notices.push(Notice::AutoEnabled);
        true
    } else {
        config.enabled
    };

    if !enabled {
        return Resolution {
            mode: CryptoMode::Disabled,
            notices,
        };
    }

    let mode = CryptoMode::from_toggles(config.encryption_enabled, config.signing_enabled);
    if mode == CryptoMode::Disabled {
        notices.push(Notice::NothingProtected);
    }

    Resolution { mode, notices }
}
