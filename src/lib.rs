//! Token ticket library.
//!
//! Mints portable, optionally signed and encrypted tokens for validated
//! service tickets, and parses them back into claims.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod crypto;
pub mod error;
pub mod metrics;
pub mod telemetry;
pub mod ticket;
pub mod token;

// Re-exports for convenience
pub use config::Config;
pub use crypto::{CipherError, CipherExecutor, CryptoMode, CryptographyConfig};
pub use error::TokenError;
pub use ticket::{ExpirationBounds, ExpirationPolicy, TicketValidator, ValidatedTicket};
pub use token::{Claims, TokenTicketBuilder};
