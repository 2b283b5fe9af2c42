//! Key and IV derivation using PBKDF2-HMAC-SHA256.
//!
//! Matches `openssl enc -pbkdf2`: one PBKDF2 run produces 48 bytes, the
//! first 32 are the AES-256 key and the last 16 the CBC initialization vector.

use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

/// PBKDF2 iteration count (the `openssl enc -pbkdf2` default).
pub const PBKDF2_ITERATIONS: u32 = 10_000;

/// Salt length stored in the envelope header.
pub const SALT_LENGTH: usize = 8;

/// AES-256 key length.
pub const KEY_LENGTH: usize = 32;

/// CBC initialization vector length (one AES block).
pub const IV_LENGTH: usize = 16;

/// Key material derived from a password and salt.
///
/// Zeroized from memory on drop.
#[derive(ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
    iv: [u8; IV_LENGTH],
}

impl DerivedKey {
    /// Raw AES key bytes. Use only for immediate cipher construction.
    pub fn key(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }

    /// Raw CBC initialization vector.
    pub fn iv(&self) -> &[u8; IV_LENGTH] {
        &self.iv
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .field("iv", &"[REDACTED]")
            .finish()
    }
}

/// Derive the AES key and IV for `password` and the envelope `salt`.
///
/// Deterministic: the same password and salt always give the same key.
pub fn derive_key(password: &[u8], salt: &[u8; SALT_LENGTH]) -> DerivedKey {
    let mut material = zeroize::Zeroizing::new([0u8; KEY_LENGTH + IV_LENGTH]);
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, PBKDF2_ITERATIONS, material.as_mut());

    let mut key = [0u8; KEY_LENGTH];
    let mut iv = [0u8; IV_LENGTH];
    key.copy_from_slice(&material[..KEY_LENGTH]);
    iv.copy_from_slice(&material[KEY_LENGTH..]);

    DerivedKey { key, iv }
}
