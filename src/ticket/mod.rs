//! Contracts for the ticket collaborators the builder consumes.

pub mod expiration;
pub mod validator;

pub use expiration::{ExpirationBounds, ExpirationPolicy, ExpirationPolicyError, TimeToLiveExpirationPolicy};
pub use validator::{TicketValidationError, TicketValidator, ValidatedTicket};
