//! Token ticket claims.

use crate::ticket::ExpirationBounds;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Claims asserted by a token ticket.
///
/// Field declaration order is the canonical encoding order; see
/// [`ClaimsSerializer`](super::ClaimsSerializer).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    /// Authenticated principal
    #[serde(rename = "sub")]
    pub subject: String,
    /// Issuing server prefix
    #[serde(rename = "iss")]
    pub issuer: String,
    /// Service the ticket was issued for
    #[serde(rename = "aud")]
    pub audience: String,
    /// Issuance, seconds since the Unix epoch
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Expiry, seconds since the Unix epoch
    #[serde(rename = "exp")]
    pub expires_at: i64,
    /// Ticket the token was minted from
    #[serde(rename = "jti")]
    pub ticket_id: String,
    /// Released principal attributes
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl Claims {
    /// Claims for a validated ticket with the given lifetime.
    pub fn new(
        subject: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        ticket_id: impl Into<String>,
        bounds: ExpirationBounds,
    ) -> Self {
        Claims {
            subject: subject.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            issued_at: bounds.issued_at(),
            expires_at: bounds.expires_at(),
            ticket_id: ticket_id.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Replace the released attributes.
    pub fn with_attributes(mut self, attributes: BTreeMap<String, Vec<String>>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Add a released attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.attributes.insert(name.into(), values);
        self
    }

    /// Whether the token has expired as of now.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= chrono::Utc::now().timestamp()
    }

    /// Whether `timestamp` falls within `[issued_at, expires_at)`.
    pub fn is_valid_at(&self, timestamp: i64) -> bool {
        timestamp >= self.issued_at && timestamp < self.expires_at
    }
}
