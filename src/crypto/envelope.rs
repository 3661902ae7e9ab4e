//! Compact token envelope.
//!
//! A token is `header.segment[.segment]`, every part base64url without
//! padding. The header is compact JSON naming the format version, the
//! protection mode and the algorithms in use:
//!
//! | mode      | layout    | notes                                        |
//! |-----------|-----------|----------------------------------------------|
//! | `none`    | `H.P`     | payload only                                 |
//! | `sig`     | `H.P.S`   | HMAC over ASCII `H.P`                        |
//! | `enc`     | `H.N.C`   | AES-GCM, AAD = ASCII `H`                     |
//! | `sig+enc` | `H.N.C`   | plaintext is ASCII `P.S`, signed as for `sig`|

use super::config::{EncryptionAlgorithm, SigningAlgorithm};
use super::policy::CryptoMode;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Current envelope format version.
pub const ENVELOPE_VERSION: u8 = 1;

/// Separator between envelope segments.
pub const SEPARATOR: char = '.';

/// Self-describing envelope header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvelopeHeader {
    /// Format version
    pub ver: u8,
    /// Protection mode
    pub mode: CryptoMode,
    /// Content-encryption algorithm, when encrypting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enc: Option<EncryptionAlgorithm>,
    /// Signing algorithm, when signing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<SigningAlgorithm>,
}

impl EnvelopeHeader {
    /// Header for a mode and its algorithms. Algorithms the mode does not use
    /// are dropped.
    #[must_use]
    pub fn new(mode: CryptoMode, enc: EncryptionAlgorithm, alg: SigningAlgorithm) -> Self {
        Self {
            ver: ENVELOPE_VERSION,
            mode,
            enc: mode.encrypts().then_some(enc),
            alg: mode.signs().then_some(alg),
        }
    }

    /// Encoded header segment.
    #[must_use]
    pub fn encode(&self) -> String {
        // Serializing a struct of enums and integers cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a header segment, if it is one.
    #[must_use]
    pub fn decode(segment: &str) -> Option<Self> {
        let json = URL_SAFE_NO_PAD.decode(segment).ok()?;
        serde_json::from_slice(&json).ok()
    }
}

/// Base64url-encode a segment.
#[must_use]
pub fn encode_segment(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Base64url-decode a segment.
#[must_use]
pub fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(segment).ok()
}

/// Join segments with [`SEPARATOR`].
#[must_use]
pub fn join(segments: &[&str]) -> String {
    segments.join(".")
}

/// Split into exactly `N` segments.
#[must_use]
pub fn split<const N: usize>(token: &str) -> Option<[&str; N]> {
    let mut parts = token.split(SEPARATOR);
    let mut out = [""; N];
    for slot in &mut out {
        *slot = parts.next()?;
    }
    parts.next().is_none().then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_drops_unused_algorithms() {
        let header = EnvelopeHeader::new(CryptoMode::SignOnly, EncryptionAlgorithm::A256Gcm, SigningAlgorithm::HS512);
        assert_eq!(header.enc, None);
        assert_eq!(header.alg, Some(SigningAlgorithm::HS512));

        let header = EnvelopeHeader::new(CryptoMode::Disabled, EncryptionAlgorithm::A256Gcm, SigningAlgorithm::HS512);
        assert_eq!(header.enc, None);
        assert_eq!(header.alg, None);
    }

    #[test]
    fn test_header_json_layout() {
        let header = EnvelopeHeader::new(
            CryptoMode::EncryptAndSign,
            EncryptionAlgorithm::A128Gcm,
            SigningAlgorithm::HS256,
        );
        let json = URL_SAFE_NO_PAD.decode(header.encode()).unwrap();
        assert_eq!(
            String::from_utf8(json).unwrap(),
            r#"{"ver":1,"mode":"sig+enc","enc":"A128GCM","alg":"HS256"}"#
        );
    }

    #[test]
    fn test_header_decode() {
        let header = EnvelopeHeader::new(CryptoMode::EncryptOnly, EncryptionAlgorithm::A256Gcm, SigningAlgorithm::HS512);
        assert_eq!(EnvelopeHeader::decode(&header.encode()), Some(header));
        assert_eq!(EnvelopeHeader::decode("not a header"), None);

        let extra = URL_SAFE_NO_PAD.encode(r#"{"ver":1,"mode":"none","kid":"x"}"#);
        assert_eq!(EnvelopeHeader::decode(&extra), None);
    }

    #[test]
    fn test_split_exact() {
        assert_eq!(split::<2>("a.b"), Some(["a", "b"]));
        assert_eq!(split::<3>("a.b.c"), Some(["a", "b", "c"]));
        assert_eq!(split::<2>("a.b.c"), None);
        assert_eq!(split::<3>("a.b"), None);
        assert_eq!(split::<2>("a.."), None);
        assert_eq!(split::<3>("a..c"), Some(["a", "", "c"]));
    }
}
