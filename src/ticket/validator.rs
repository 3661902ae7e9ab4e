//! Ticket validation contract.

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

/// Result of a successful ticket validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTicket {
    /// Authenticated principal
    pub principal: String,
    /// Service the ticket was issued for
    pub service: String,
    /// Principal attributes released with the ticket
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl ValidatedTicket {
    /// Ticket for `principal` at `service`, without attributes.
    pub fn new(principal: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            service: service.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add a released attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.attributes.insert(name.into(), values);
        self
    }
}

/// Reasons a ticket fails validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketValidationError {
    /// Ticket identifier is blank or malformed.
    #[error("Invalid ticket identifier")]
    InvalidTicketId,

    /// Authority does not know the ticket.
    #[error("Ticket not recognized: {0}")]
    UnknownTicket(String),

    /// Ticket is past its validity window.
    #[error("Ticket expired: {0}")]
    Expired(String),

    /// Authority refused the ticket.
    #[error("Ticket rejected: {reason}")]
    Rejected {
        /// Authority's explanation
        reason: String,
    },

    /// Authority could not be reached; may succeed on retry.
    #[error("Ticket validation unavailable: {0}")]
    Unavailable(String),
}

impl TicketValidationError {
    /// Whether the caller may retry. Never retried inside this crate.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, TicketValidationError::Unavailable(_))
    }

    /// Stable code for metrics and diagnostics.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            TicketValidationError::InvalidTicketId => "TICKET_ID_INVALID",
            TicketValidationError::UnknownTicket(_) => "TICKET_UNKNOWN",
            TicketValidationError::Expired(_) => "TICKET_EXPIRED",
            TicketValidationError::Rejected { .. } => "TICKET_REJECTED",
            TicketValidationError::Unavailable(_) => "TICKET_VALIDATION_UNAVAILABLE",
        }
    }
}

/// Validates service tickets against the issuing authority.
///
/// Implementations own any network I/O; the builder only awaits the result.
#[async_trait]
pub trait TicketValidator: Send + Sync {
    /// Validate a ticket and return the principal and service it was issued for.
    async fn validate(&self, ticket_id: &str) -> Result<ValidatedTicket, TicketValidationError>;
}
