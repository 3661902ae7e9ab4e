//! Expiration policy contract.

use chrono::Utc;
use std::time::Duration;
use thiserror::Error;

/// Issuance and expiry of a ticket, in seconds since the Unix epoch.
///
/// `expires_at` is always strictly after `issued_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationBounds {
    issued_at: i64,
    expires_at: i64,
}

impl ExpirationBounds {
    /// Create bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ExpirationPolicyError::InvalidBounds`] unless
    /// `expires_at > issued_at`.
    pub fn new(issued_at: i64, expires_at: i64) -> Result<Self, ExpirationPolicyError> {
        if expires_at <= issued_at {
            return Err(ExpirationPolicyError::InvalidBounds {
                issued_at,
                expires_at,
            });
        }
        Ok(Self {
            issued_at,
            expires_at,
        })
    }

    /// Issuance timestamp.
    #[must_use]
    pub const fn issued_at(&self) -> i64 {
        self.issued_at
    }

    /// Expiry timestamp.
    #[must_use]
    pub const fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Lifetime in seconds.
    #[must_use]
    pub const fn time_to_live(&self) -> i64 {
        self.expires_at - self.issued_at
    }
}

/// Errors raised by an [`ExpirationPolicy`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpirationPolicyError {
    /// No policy covers the ticket.
    #[error("No expiration policy applies to ticket: {0}")]
    UnknownTicket(String),

    /// Expiry is not strictly after issuance.
    #[error("Invalid expiration bounds: issued at {issued_at}, expires at {expires_at}")]
    InvalidBounds {
        /// Proposed issuance
        issued_at: i64,
        /// Proposed expiry
        expires_at: i64,
    },

    /// Policy backend could not be reached.
    #[error("Expiration policy unavailable: {0}")]
    Unavailable(String),
}

impl ExpirationPolicyError {
    /// Stable code for metrics and diagnostics.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            ExpirationPolicyError::UnknownTicket(_) => "EXPIRATION_UNKNOWN_TICKET",
            ExpirationPolicyError::InvalidBounds { .. } => "EXPIRATION_INVALID_BOUNDS",
            ExpirationPolicyError::Unavailable(_) => "EXPIRATION_UNAVAILABLE",
        }
    }
}

/// Supplies the lifetime of a validated ticket.
pub trait ExpirationPolicy: Send + Sync {
    /// Issuance and expiry for the ticket.
    fn bounds_for(&self, ticket_id: &str) -> Result<ExpirationBounds, ExpirationPolicyError>;
}

/// Hard-timeout policy: tickets live for a fixed duration from now.
#[derive(Debug, Clone)]
pub struct TimeToLiveExpirationPolicy {
    time_to_live: Duration,
}

impl TimeToLiveExpirationPolicy {
    /// Policy granting `time_to_live` from the moment of issuance.
    #[must_use]
    pub const fn new(time_to_live: Duration) -> Self {
        Self { time_to_live }
    }

    /// Configured lifetime.
    #[must_use]
    pub const fn time_to_live(&self) -> Duration {
        self.time_to_live
    }
}

impl ExpirationPolicy for TimeToLiveExpirationPolicy {
    fn bounds_for(&self, _ticket_id: &str) -> Result<ExpirationBounds, ExpirationPolicyError> {
        let ttl = i64::try_from(self.time_to_live.as_secs())
            .map_err(|_| ExpirationPolicyError::Unavailable("time to live out of range".to_string()))?;
        let now = Utc::now().timestamp();
        let expires_at = now
            .checked_add(ttl)
            .ok_or_else(|| ExpirationPolicyError::Unavailable("time to live out of range".to_string()))?;

        ExpirationBounds::new(now, expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_invariant() {
        let bounds = ExpirationBounds::new(1000, 1300).unwrap();
        assert_eq!(bounds.issued_at(), 1000);
        assert_eq!(bounds.expires_at(), 1300);
        assert_eq!(bounds.time_to_live(), 300);

        assert!(matches!(
            ExpirationBounds::new(1000, 1000),
            Err(ExpirationPolicyError::InvalidBounds { .. })
        ));
        assert!(ExpirationBounds::new(1000, 999).is_err());
    }

    #[test]
    fn test_time_to_live_policy() {
        let policy = TimeToLiveExpirationPolicy::new(Duration::from_secs(300));
        let before = Utc::now().timestamp();
        let bounds = policy.bounds_for("TGT-1").unwrap();
        let after = Utc::now().timestamp();

        assert!(bounds.issued_at() >= before && bounds.issued_at() <= after);
        assert_eq!(bounds.time_to_live(), 300);
    }

    #[test]
    fn test_zero_time_to_live_rejected() {
        let policy = TimeToLiveExpirationPolicy::new(Duration::ZERO);
        assert!(matches!(
            policy.bounds_for("TGT-1"),
            Err(ExpirationPolicyError::InvalidBounds { .. })
        ));
    }
}
