//! The embedded, base64-encoded encrypted payload.

use std::borrow::Cow;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Result, SealError};

/// Column width used when encoding, matching `openssl enc -a`.
const LINE_WIDTH: usize = 64;

/// An immutable base64 text envelope holding a salted AES-256-CBC ciphertext.
///
/// The salt lives inside the decoded envelope; nothing else is needed to
/// decrypt besides the password.
#[derive(Debug, Clone)]
pub struct EncryptedPayload {
    encoded: Cow<'static, [u8]>,
}

impl EncryptedPayload {
    /// Cipher used for the envelope.
    pub const ALGORITHM: &'static str = "aes-256-cbc";

    /// Key derivation function used for the envelope.
    pub const KDF: &'static str = "pbkdf2";

    /// Wrap payload text baked into the binary.
    pub fn from_static(encoded: &'static [u8]) -> Self {
        Self {
            encoded: Cow::Borrowed(encoded),
        }
    }

    /// Wrap payload text loaded at runtime.
    pub fn from_encoded(encoded: impl Into<Cow<'static, [u8]>>) -> Self {
        Self {
            encoded: encoded.into(),
        }
    }

    /// Encode a binary envelope as wrapped base64 text.
    pub fn encode(envelope: &[u8]) -> Self {
        let text = STANDARD.encode(envelope);
        let mut wrapped = String::with_capacity(text.len() + text.len() / LINE_WIDTH + 1);
        for line in text.as_bytes().chunks(LINE_WIDTH) {
            // base64 output is pure ASCII, so chunk boundaries are char boundaries.
            wrapped.push_str(&String::from_utf8_lossy(line));
            wrapped.push('\n');
        }
        Self::from_encoded(wrapped.into_bytes())
    }

    /// Raw encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.encoded
    }

    /// Length of the encoded text in bytes.
    pub fn len(&self) -> usize {
        self.encoded.len()
    }

    /// Whether the encoded text is empty.
    pub fn is_empty(&self) -> bool {
        self.encoded.is_empty()
    }

    /// Decode the base64 text into the binary envelope.
    ///
    /// Whitespace anywhere in the text is ignored, so the line-wrap width
    /// does not matter.
    ///
    /// # Errors
    ///
    /// Malformed base64 is reported as `SealError::Decryption`, the same
    /// category as a wrong password.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let compact: Vec<u8> = self
            .encoded
            .iter()
            .copied()
            .filter(|byte| !byte.is_ascii_whitespace())
            .collect();
        STANDARD.decode(compact).map_err(|_| SealError::Decryption)
    }

    /// Short blake3 fingerprint of the encoded text, for identifying builds.
    pub fn fingerprint(&self) -> String {
        let hash = blake3::hash(&self.encoded);
        hash.to_hex()[..16].to_string()
    }
}
