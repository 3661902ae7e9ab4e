//! Token protection executor.

use super::config::{CryptographyConfig, EncryptionAlgorithm, SigningAlgorithm};
use super::envelope::{self, EnvelopeHeader};
use super::error::CipherError;
use super::keys::{ContentKey, SigningKey};
use super::policy::{self, CryptoMode, Notice, Resolution};
use crate::metrics;
use std::fmt;
use tracing::{info, warn};

/// Applies the resolved protection mode to token payloads.
///
/// Immutable after construction and safe to share across threads.
pub struct CipherExecutor {
    mode: CryptoMode,
    header: String,
    content_key: Option<ContentKey>,
    signing_key: Option<SigningKey>,
}

impl fmt::Debug for CipherExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherExecutor")
            .field("mode", &self.mode)
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

impl CipherExecutor {
    /// Resolve the configuration, emit its notices and build the executor.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Configuration`] if the resolved mode needs a key
    /// that is missing or has an invalid size, or an algorithm is unknown.
    pub fn from_config(config: &CryptographyConfig) -> Result<Self, CipherError> {
        let resolution = policy::resolve(config);

        for notice in &resolution.notices {
            if *notice == Notice::AutoEnabled {
                metrics::record_crypto_auto_enabled();
            }
            warn!(notice = ?notice, "{}", notice);
        }

        let executor = Self::with_resolution(&resolution, config)?;
        if executor.mode == CryptoMode::Disabled {
            info!(
                "Token encryption/signing is turned off. This MAY NOT be safe in a production \
                 environment; consider signing and encrypting issued tokens."
            );
        } else {
            info!(mode = %executor.mode, "Token cryptography enabled");
        }

        Ok(executor)
    }

    /// Build the executor for an already resolved mode. Does not log.
    ///
    /// # Errors
    ///
    /// See [`CipherExecutor::from_config`].
    pub fn with_resolution(
        resolution: &Resolution,
        config: &CryptographyConfig,
    ) -> Result<Self, CipherError> {
        let mode = resolution.mode;

        // Algorithms the mode does not use are never parsed; the header drops them.
        let (enc, content_key) = if mode.encrypts() {
            let enc: EncryptionAlgorithm = config.algorithm.parse()?;
            (enc, Some(ContentKey::new(enc, config.encryption_key.as_deref())?))
        } else {
            (EncryptionAlgorithm::A256Gcm, None)
        };

        let (alg, signing_key) = if mode.signs() {
            let alg: SigningAlgorithm = config.signing_algorithm.parse()?;
            (alg, Some(SigningKey::new(alg, config.signing_key.as_deref())?))
        } else {
            (SigningAlgorithm::HS512, None)
        };

        Ok(Self {
            mode,
            header: EnvelopeHeader::new(mode, enc, alg).encode(),
            content_key,
            signing_key,
        })
    }

    /// Executor that applies no cryptographic transform.
    #[must_use]
    pub fn no_op() -> Self {
        Self {
            mode: CryptoMode::Disabled,
            header: EnvelopeHeader::new(
                CryptoMode::Disabled,
                EncryptionAlgorithm::A256Gcm,
                SigningAlgorithm::HS512,
            )
            .encode(),
            content_key: None,
            signing_key: None,
        }
    }

    /// Effective mode.
    #[must_use]
    pub const fn mode(&self) -> CryptoMode {
        self.mode
    }

    /// Protect a payload.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Encryption`] if signing or encryption fails.
    pub fn protect(&self, payload: &[u8]) -> Result<String, CipherError> {
        let body = envelope::encode_segment(payload);

        match (&self.content_key, &self.signing_key) {
            (None, None) => Ok(envelope::join(&[&self.header, &body])),
            (None, Some(signer)) => {
                let signature = signer.sign(envelope::join(&[&self.header, &body]).as_bytes())?;
                Ok(envelope::join(&[&self.header, &body, &signature]))
            }
            (Some(key), None) => self.seal(key, payload),
            (Some(key), Some(signer)) => {
                let signature = signer.sign(envelope::join(&[&self.header, &body]).as_bytes())?;
                self.seal(key, envelope::join(&[&body, &signature]).as_bytes())
            }
        }
    }

    /// Reverse [`CipherExecutor::protect`].
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Decryption`] if the token cannot be decrypted or
    /// does not carry this executor's header, and
    /// [`CipherError::Verification`] if a signature does not match.
    pub fn unprotect(&self, token: &str) -> Result<Vec<u8>, CipherError> {
        let header = token.split(envelope::SEPARATOR).next().unwrap_or_default();
        if header != self.header {
            return Err(self.header_mismatch(header));
        }

        match (&self.content_key, &self.signing_key) {
            (None, None) => {
                let [_, body] = envelope::split::<2>(token).ok_or_else(|| self.malformed())?;
                envelope::decode_segment(body).ok_or_else(|| self.malformed())
            }
            (None, Some(signer)) => {
                let [_, body, signature] = envelope::split::<3>(token).ok_or_else(|| self.malformed())?;
                self.verify(signer, body, signature)
            }
            (Some(key), None) => self.open(key, token),
            (Some(key), Some(signer)) => {
                let bundle = self.open(key, token)?;
                let bundle = String::from_utf8(bundle)
                    .map_err(|_| CipherError::verification("signed bundle is malformed"))?;
                let [body, signature] = envelope::split::<2>(&bundle)
                    .ok_or_else(|| CipherError::verification("signed bundle is malformed"))?;
                self.verify(signer, body, signature)
            }
        }
    }

    fn seal(&self, key: &ContentKey, plaintext: &[u8]) -> Result<String, CipherError> {
        let (nonce, ciphertext) = key.seal(self.header.as_bytes(), plaintext)?;
        Ok(envelope::join(&[
            &self.header,
            &envelope::encode_segment(&nonce),
            &envelope::encode_segment(&ciphertext),
        ]))
    }

    fn open(&self, key: &ContentKey, token: &str) -> Result<Vec<u8>, CipherError> {
        let [_, nonce, ciphertext] = envelope::split::<3>(token).ok_or_else(|| self.malformed())?;
        let nonce = envelope::decode_segment(nonce).ok_or_else(|| self.malformed())?;
        let ciphertext = envelope::decode_segment(ciphertext).ok_or_else(|| self.malformed())?;
        key.open(&nonce, self.header.as_bytes(), &ciphertext)
    }

    fn verify(&self, signer: &SigningKey, body: &str, signature: &str) -> Result<Vec<u8>, CipherError> {
        let signing_input = envelope::join(&[&self.header, body]);
        if !signer.verify(signature, signing_input.as_bytes()) {
            return Err(CipherError::verification("token signature is invalid"));
        }
        envelope::decode_segment(body)
            .ok_or_else(|| CipherError::verification("token payload is malformed"))
    }

    fn rejection(&self, msg: String) -> CipherError {
        if self.mode == CryptoMode::SignOnly {
            CipherError::Verification(msg)
        } else {
            CipherError::Decryption(msg)
        }
    }

    fn malformed(&self) -> CipherError {
        self.rejection("token is malformed".to_string())
    }

    fn header_mismatch(&self, found: &str) -> CipherError {
        match EnvelopeHeader::decode(found) {
            Some(other) => self.rejection(format!(
                "token was protected with mode '{}' (version {}), expected '{}'",
                other.mode, other.ver, self.mode
            )),
            None => self.malformed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;

    fn config() -> CryptographyConfig {
        CryptographyConfig::default()
            .with_enabled(true)
            .with_encryption_key(URL_SAFE_NO_PAD.encode([7u8; 32]))
            .with_signing_key(URL_SAFE_NO_PAD.encode([9u8; 64]))
    }

    fn executor(encrypt: bool, sign: bool) -> CipherExecutor {
        CipherExecutor::from_config(
            &config()
                .with_encryption_enabled(encrypt)
                .with_signing_enabled(sign),
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip_all_modes() {
        for (encrypt, sign) in [(false, false), (true, false), (false, true), (true, true)] {
            let executor = executor(encrypt, sign);
            let token = executor.protect(b"payload").unwrap();
            assert_eq!(executor.unprotect(&token).unwrap(), b"payload");
        }
    }

    #[test]
    fn test_modes_resolved() {
        assert_eq!(executor(true, true).mode(), CryptoMode::EncryptAndSign);
        assert_eq!(executor(true, false).mode(), CryptoMode::EncryptOnly);
        assert_eq!(executor(false, true).mode(), CryptoMode::SignOnly);
        assert_eq!(executor(false, false).mode(), CryptoMode::Disabled);
        assert_eq!(CipherExecutor::no_op().mode(), CryptoMode::Disabled);
    }

    #[test]
    fn test_sign_only_keeps_payload_visible() {
        let executor = executor(false, true);
        let token = executor.protect(b"visible").unwrap();
        let [_, body, _] = envelope::split::<3>(&token).unwrap();
        assert_eq!(envelope::decode_segment(body).unwrap(), b"visible");
    }

    #[test]
    fn test_encryption_hides_payload_and_uses_fresh_nonce() {
        let executor = executor(true, true);
        let first = executor.protect(b"secret-payload").unwrap();
        let second = executor.protect(b"secret-payload").unwrap();
        assert_ne!(first, second);
        assert!(!first.contains(&envelope::encode_segment(b"secret-payload")));
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let config = CryptographyConfig::default()
            .with_enabled(true)
            .with_signing_enabled(false);
        let result = CipherExecutor::from_config(&config);
        assert!(matches!(result, Err(CipherError::Configuration(_))));
    }

    #[test]
    fn test_invalid_key_size_is_configuration_error() {
        let config = config().with_encryption_key(URL_SAFE_NO_PAD.encode([1u8; 20]));
        assert!(matches!(
            CipherExecutor::from_config(&config),
            Err(CipherError::Configuration(_))
        ));
    }

    #[test]
    fn test_unknown_algorithm_is_configuration_error() {
        let config = config().with_algorithm("A192CBC-HS384");
        assert!(matches!(
            CipherExecutor::from_config(&config),
            Err(CipherError::Configuration(_))
        ));
    }

    #[test]
    fn test_unused_algorithms_are_not_parsed() {
        let executor = CipherExecutor::from_config(
            &CryptographyConfig::default()
                .with_algorithm("")
                .with_signing_algorithm(""),
        )
        .unwrap();
        assert_eq!(executor.mode(), CryptoMode::Disabled);
        assert_eq!(executor.header, CipherExecutor::no_op().header);

        let signer = CipherExecutor::from_config(
            &config()
                .with_encryption_enabled(false)
                .with_algorithm("A128CBC-HS256"),
        )
        .unwrap();
        assert_eq!(signer.mode(), CryptoMode::SignOnly);
        let token = signer.protect(b"payload").unwrap();
        assert_eq!(signer.unprotect(&token).unwrap(), b"payload");

        let sealer = CipherExecutor::from_config(
            &config()
                .with_signing_enabled(false)
                .with_signing_algorithm("RS256"),
        )
        .unwrap();
        assert_eq!(sealer.mode(), CryptoMode::EncryptOnly);
    }

    #[test]
    fn test_used_algorithm_still_validated() {
        let config = config()
            .with_encryption_enabled(false)
            .with_signing_algorithm("none");
        assert!(matches!(
            CipherExecutor::from_config(&config),
            Err(CipherError::Configuration(_))
        ));
    }

    #[test]
    fn test_disabled_ignores_keys() {
        let config = CryptographyConfig::default().with_signing_key("too-short");
        let executor = CipherExecutor::from_config(&config).unwrap();
        assert_eq!(executor.mode(), CryptoMode::Disabled);
    }

    #[test]
    fn test_rejects_other_mode_tokens() {
        let signed = executor(false, true).protect(b"payload").unwrap();
        let encrypted = executor(true, false).protect(b"payload").unwrap();
        let plain = executor(false, false).protect(b"payload").unwrap();

        assert!(matches!(
            executor(true, true).unprotect(&signed),
            Err(CipherError::Decryption(_))
        ));
        assert!(matches!(
            executor(false, true).unprotect(&encrypted),
            Err(CipherError::Verification(_))
        ));
        assert!(matches!(
            executor(false, true).unprotect(&plain),
            Err(CipherError::Verification(_))
        ));
        assert!(matches!(
            executor(false, false).unprotect(&signed),
            Err(CipherError::Decryption(_))
        ));
    }

    #[test]
    fn test_wrong_signing_key_fails_verification() {
        let token = executor(true, true).protect(b"payload").unwrap();
        let other = CipherExecutor::from_config(
            &config().with_signing_key(URL_SAFE_NO_PAD.encode([8u8; 64])),
        )
        .unwrap();

        assert!(matches!(other.unprotect(&token), Err(CipherError::Verification(_))));
    }

    #[test]
    fn test_wrong_encryption_key_fails_decryption() {
        let token = executor(true, false).protect(b"payload").unwrap();
        let other = CipherExecutor::from_config(
            &config()
                .with_signing_enabled(false)
                .with_encryption_key(URL_SAFE_NO_PAD.encode([6u8; 32])),
        )
        .unwrap();

        assert!(matches!(other.unprotect(&token), Err(CipherError::Decryption(_))));
    }

    #[test]
    fn test_garbage_tokens_rejected() {
        let executor = executor(true, true);
        for token in ["", ".", "abc", "a.b.c", "a.b.c.d"] {
            assert!(matches!(executor.unprotect(token), Err(CipherError::Decryption(_))));
        }
    }

    #[test]
    fn test_debug_omits_keys() {
        let debug = format!("{:?}", executor(true, true));
        assert!(debug.contains("EncryptAndSign"));
        assert!(!debug.contains("content_key"));
    }
}
