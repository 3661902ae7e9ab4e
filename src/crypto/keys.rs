//! Key material decoding and the primitives built from it.

use super::config::{EncryptionAlgorithm, SigningAlgorithm};
use super::error::CipherError;
use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes128Gcm, Aes256Gcm, Nonce,
};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use jsonwebtoken::{DecodingKey, EncodingKey};
use rand::RngCore;
use zeroize::Zeroizing;

/// Size of the GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Decode configured key material.
///
/// Candidates are tried in order: base64url without padding, standard base64,
/// then the raw UTF-8 bytes. The first candidate whose length `accepts` wins.
fn decode_key<F>(
    name: &str,
    raw: Option<&str>,
    accepts: F,
    requirement: &str,
) -> Result<Zeroizing<Vec<u8>>, CipherError>
where
    F: Fn(usize) -> bool,
{
    let raw = raw
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| CipherError::configuration(format!("{} is required", name)))?;

    let candidates = [
        URL_SAFE_NO_PAD.decode(raw).ok(),
        STANDARD.decode(raw).ok(),
        Some(raw.as_bytes().to_vec()),
    ];

    candidates
        .into_iter()
        .flatten()
        .map(Zeroizing::new)
        .find(|bytes| accepts(bytes.len()))
        .ok_or_else(|| CipherError::configuration(format!("{} must be {}", name, requirement)))
}

/// AES-GCM content key.
pub(crate) enum ContentKey {
    Aes128(Aes128Gcm),
    Aes256(Aes256Gcm),
}

impl ContentKey {
    pub(crate) fn new(algorithm: EncryptionAlgorithm, raw: Option<&str>) -> Result<Self, CipherError> {
        let expected = algorithm.key_len();
        let bytes = decode_key(
            "encryption key",
            raw,
            |len| len == expected,
            &format!("{} bytes for {}", expected, algorithm),
        )?;

        let invalid = |_| CipherError::configuration(format!("invalid {} key", algorithm));
        match algorithm {
            EncryptionAlgorithm::A128Gcm => Aes128Gcm::new_from_slice(&bytes).map(Self::Aes128).map_err(invalid),
            EncryptionAlgorithm::A256Gcm => Aes256Gcm::new_from_slice(&bytes).map(Self::Aes256).map_err(invalid),
        }
    }

    /// Encrypt under a fresh random nonce. Returns `(nonce, ciphertext || tag)`.
    pub(crate) fn seal(&self, aad: &[u8], plaintext: &[u8]) -> Result<([u8; NONCE_SIZE], Vec<u8>), CipherError> {
        let mut nonce = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce);

        let payload = Payload { msg: plaintext, aad };
        let ciphertext = match self {
            Self::Aes128(cipher) => cipher.encrypt(Nonce::from_slice(&nonce), payload),
            Self::Aes256(cipher) => cipher.encrypt(Nonce::from_slice(&nonce), payload),
        }
        .map_err(|_| CipherError::encryption("unable to encrypt token"))?;

        Ok((nonce, ciphertext))
    }

    /// Decrypt and authenticate. All failures look the same to the caller.
    pub(crate) fn open(&self, nonce: &[u8], aad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        if nonce.len() != NONCE_SIZE {
            return Err(CipherError::decryption("unable to decrypt token"));
        }

        let payload = Payload { msg: ciphertext, aad };
        match self {
            Self::Aes128(cipher) => cipher.decrypt(Nonce::from_slice(nonce), payload),
            Self::Aes256(cipher) => cipher.decrypt(Nonce::from_slice(nonce), payload),
        }
        .map_err(|_| CipherError::decryption("unable to decrypt token"))
    }
}

/// HMAC signing key.
pub(crate) struct SigningKey {
    algorithm: SigningAlgorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    pub(crate) fn new(algorithm: SigningAlgorithm, raw: Option<&str>) -> Result<Self, CipherError> {
        let min = algorithm.min_key_len();
        let bytes = decode_key(
            "signing key",
            raw,
            |len| len >= min,
            &format!("at least {} bytes for {}", min, algorithm),
        )?;

        Ok(Self {
            algorithm,
            encoding: EncodingKey::from_secret(&bytes),
            decoding: DecodingKey::from_secret(&bytes),
        })
    }

    /// Base64url signature over `message`.
    pub(crate) fn sign(&self, message: &[u8]) -> Result<String, CipherError> {
        jsonwebtoken::crypto::sign(message, &self.encoding, self.algorithm.jws())
            .map_err(|e| CipherError::encryption(format!("unable to sign token: {}", e)))
    }

    pub(crate) fn verify(&self, signature: &str, message: &[u8]) -> bool {
        jsonwebtoken::crypto::verify(signature, message, &self.decoding, self.algorithm.jws())
            .unwrap_or(false)
    }
}
