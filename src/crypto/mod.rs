//! Token protection.
//!
//! Resolves the protection mode from configuration and applies it to
//! serialized token payloads.

pub mod config;
pub mod envelope;
pub mod error;
pub mod executor;
mod keys;
pub mod policy;

// Re-exports
pub use config::{CryptographyConfig, EncryptionAlgorithm, SigningAlgorithm};
pub use envelope::EnvelopeHeader;
pub use error::CipherError;
pub use executor::CipherExecutor;
pub use policy::{resolve, CryptoMode, Notice, Resolution};
