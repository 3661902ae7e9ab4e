//! Canonical claims encoding.
//!
//! Claims are encoded as compact JSON with the fields in the fixed order
//! `sub`, `iss`, `aud`, `iat`, `exp`, `jti`, `attributes`. Attribute names are
//! sorted and the `attributes` member is omitted when empty, so equal claims
//! always encode to identical bytes.

use crate::error::TokenError;
use crate::token::claims::Claims;

/// Canonical JSON codec for [`Claims`].
pub struct ClaimsSerializer;

impl ClaimsSerializer {
    /// Encode claims, refusing an inverted lifetime.
    pub fn serialize(claims: &Claims) -> Result<Vec<u8>, TokenError> {
        check_lifetime(claims).map_err(TokenError::Serialization)?;
        serde_json::to_vec(claims).map_err(|e| TokenError::Serialization(e.to_string()))
    }

    /// Decode claims, rejecting unknown members and inverted lifetimes.
    pub fn deserialize(bytes: &[u8]) -> Result<Claims, TokenError> {
        let claims: Claims =
            serde_json::from_slice(bytes).map_err(|e| TokenError::Parse(e.to_string()))?;
        check_lifetime(&claims).map_err(TokenError::Parse)?;
        Ok(claims)
    }
}

fn check_lifetime(claims: &Claims) -> Result<(), String> {
    if claims.expires_at <= claims.issued_at {
        return Err(format!(
            "expiration {} is not after issuance {}",
            claims.expires_at, claims.issued_at
        ));
    }
    Ok(())
}
