//! Token ticket issuance and introspection.

use crate::config::Config;
use crate::crypto::CipherExecutor;
use crate::error::TokenError;
use crate::metrics;
use crate::ticket::{
    ExpirationPolicy, TicketValidationError, TicketValidator, TimeToLiveExpirationPolicy,
};
use crate::token::claims::Claims;
use crate::token::serializer::ClaimsSerializer;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Mints protected tokens for validated service tickets.
///
/// Holds only shared, immutable collaborators; `build` and `parse` may run
/// concurrently from any number of tasks.
pub struct TokenTicketBuilder {
    validator: Arc<dyn TicketValidator>,
    issuer: String,
    cipher: Arc<CipherExecutor>,
    expiration_policy: Arc<dyn ExpirationPolicy>,
}

impl TokenTicketBuilder {
    /// Assemble a builder from its collaborators.
    pub fn new(
        validator: Arc<dyn TicketValidator>,
        issuer: impl Into<String>,
        cipher: Arc<CipherExecutor>,
        expiration_policy: Arc<dyn ExpirationPolicy>,
    ) -> Self {
        TokenTicketBuilder {
            validator,
            issuer: issuer.into(),
            cipher,
            expiration_policy,
        }
    }

    /// Wire a builder from process configuration, using a time-to-live
    /// expiration policy.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Cipher`] carrying
    /// [`CipherError::Configuration`](crate::crypto::CipherError::Configuration)
    /// if the cryptography settings are unusable.
    pub fn from_config(config: &Config, validator: Arc<dyn TicketValidator>) -> Result<Self, TokenError> {
        let cipher = CipherExecutor::from_config(&config.crypto)?;

        Ok(Self::new(
            validator,
            config.server_prefix.clone(),
            Arc::new(cipher),
            Arc::new(TimeToLiveExpirationPolicy::new(config.ticket_ttl)),
        ))
    }

    /// Issuer stamped into every token.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Executor protecting issued tokens.
    pub fn cipher(&self) -> &CipherExecutor {
        &self.cipher
    }

    /// Validate a ticket and mint a token for it.
    ///
    /// Validator failures are returned as they were raised. Nothing reaches
    /// the cipher executor unless validation and expiration both succeed.
    #[instrument(skip_all, fields(issuer = %self.issuer, mode = %self.cipher.mode()))]
    pub async fn build(&self, ticket_id: &str) -> Result<String, TokenError> {
        let result = self.try_build(ticket_id).await;

        match &result {
            Ok(_) => metrics::record_token_issued(self.cipher.mode().as_str()),
            Err(e) => {
                debug!(error = %e, "Token issuance denied");
                metrics::record_token_rejected("build", e.code());
            }
        }

        result
    }

    async fn try_build(&self, ticket_id: &str) -> Result<String, TokenError> {
        if ticket_id.trim().is_empty() {
            return Err(TicketValidationError::InvalidTicketId.into());
        }

        let ticket = self.validator.validate(ticket_id).await?;
        let bounds = self.expiration_policy.bounds_for(ticket_id)?;

        let claims = Claims::new(
            ticket.principal,
            self.issuer.clone(),
            ticket.service,
            ticket_id,
            bounds,
        )
        .with_attributes(ticket.attributes);

        debug!(subject = %claims.subject, audience = %claims.audience, "Issuing token ticket");
        self.encode(&claims)
    }

    /// Protect already assembled claims.
    ///
    /// Claims whose expiration is not after their issuance are refused with
    /// [`TokenError::Serialization`] before anything is protected.
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let payload = ClaimsSerializer::serialize(claims)?;
        self.cipher.protect(&payload).map_err(TokenError::build)
    }

    /// Unprotect a token and decode its claims.
    ///
    /// Expiry is not enforced here; callers decide with
    /// [`Claims::is_expired`].
    #[instrument(skip_all, fields(mode = %self.cipher.mode()))]
    pub fn parse(&self, token: &str) -> Result<Claims, TokenError> {
        let result = self
            .cipher
            .unprotect(token)
            .map_err(TokenError::from)
            .and_then(|payload| ClaimsSerializer::deserialize(&payload));

        if let Err(e) = &result {
            debug!(error = %e, "Token rejected");
            metrics::record_token_rejected("parse", e.code());
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::{ExpirationBounds, ExpirationPolicyError, ValidatedTicket};
    use async_trait::async_trait;

    struct StaticValidator;

    #[async_trait]
    impl TicketValidator for StaticValidator {
        async fn validate(&self, ticket_id: &str) -> Result<ValidatedTicket, TicketValidationError> {
            match ticket_id {
                "ST-1" => Ok(ValidatedTicket::new("alice", "https://app.example.org")
                    .with_attribute("email", vec!["alice@example.org".to_string()])),
                other => Err(TicketValidationError::UnknownTicket(other.to_string())),
            }
        }
    }

    struct FixedPolicy;

    impl ExpirationPolicy for FixedPolicy {
        fn bounds_for(&self, _ticket_id: &str) -> Result<ExpirationBounds, ExpirationPolicyError> {
            ExpirationBounds::new(1000, 1300)
        }
    }

    fn builder() -> TokenTicketBuilder {
        TokenTicketBuilder::new(
            Arc::new(StaticValidator),
            "https://sso.example.org",
            Arc::new(CipherExecutor::no_op()),
            Arc::new(FixedPolicy),
        )
    }

    #[tokio::test]
    async fn test_build_and_parse() {
        let builder = builder();
        let token = builder.build("ST-1").await.unwrap();
        let claims = builder.parse(&token).unwrap();

        assert_eq!(claims.subject, "alice");
        assert_eq!(claims.issuer, "https://sso.example.org");
        assert_eq!(claims.audience, "https://app.example.org");
        assert_eq!(claims.ticket_id, "ST-1");
        assert_eq!(claims.issued_at, 1000);
        assert_eq!(claims.expires_at, 1300);
        assert_eq!(claims.attributes["email"], vec!["alice@example.org".to_string()]);
    }

    #[tokio::test]
    async fn test_blank_ticket_rejected() {
        let result = builder().build("  ").await;
        assert!(matches!(
            result,
            Err(TokenError::TicketValidation(TicketValidationError::InvalidTicketId))
        ));
    }

    #[tokio::test]
    async fn test_unknown_ticket_propagated() {
        let result = builder().build("ST-404").await;
        assert!(matches!(
            result,
            Err(TokenError::TicketValidation(TicketValidationError::UnknownTicket(id))) if id == "ST-404"
        ));
    }

    #[test]
    fn test_encode_refuses_inverted_claims() {
        let builder = builder();
        let mut claims = Claims::new(
            "alice",
            builder.issuer(),
            "https://app.example.org",
            "ST-1",
            ExpirationBounds::new(0, 1).unwrap(),
        );
        claims.issued_at = 1;
        claims.expires_at = 0;

        assert!(matches!(builder.encode(&claims), Err(TokenError::Serialization(_))));
    }

    #[test]
    fn test_parse_rejects_non_claims_payload() {
        let builder = builder();
        let token = builder.cipher().protect(b"{\"hello\":\"world\"}").unwrap();
        assert!(matches!(builder.parse(&token), Err(TokenError::Parse(_))));
    }
}
