//! Salted AES-256-CBC envelope, byte-compatible with `openssl enc -pbkdf2`.
//!
//! Layout:
//!
//! ```text
//! "Salted__" | salt (8 bytes) | ciphertext (PKCS#7 padded, multiple of 16)
//! ```

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use super::key::{derive_key, SALT_LENGTH};
use crate::error::{Result, SealError};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Magic prefix marking a salted envelope.
pub const SALT_MAGIC: &[u8; 8] = b"Salted__";

const BLOCK_SIZE: usize = 16;
const HEADER_LENGTH: usize = SALT_MAGIC.len() + SALT_LENGTH;

/// Seal `plaintext` under `password` with a fresh random salt.
pub fn seal(plaintext: &[u8], password: &SecretString) -> Result<Vec<u8>> {
    let mut salt = [0u8; SALT_LENGTH];
    getrandom::getrandom(&mut salt)
        .map_err(|e| SealError::InvalidInput(format!("Failed to generate salt: {}", e)))?;
    seal_with_salt(plaintext, password, &salt)
}

/// Seal `plaintext` under `password` with a caller-chosen salt.
pub fn seal_with_salt(
    plaintext: &[u8],
    password: &SecretString,
    salt: &[u8; SALT_LENGTH],
) -> Result<Vec<u8>> {
    let derived = derive_key(password.expose_secret().as_bytes(), salt);
    let cipher = Aes256CbcEnc::new_from_slices(derived.key(), derived.iv())
        .map_err(|e| SealError::InvalidInput(format!("Failed to create cipher: {}", e)))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut envelope = Vec::with_capacity(HEADER_LENGTH + ciphertext.len());
    envelope.extend_from_slice(SALT_MAGIC);
    envelope.extend_from_slice(salt);
    envelope.extend_from_slice(&ciphertext);
    Ok(envelope)
}

/// Open a salted envelope with `password`.
///
/// # Errors
///
/// Returns `SealError::Decryption` for every failure. Missing magic, short or
/// misaligned ciphertext and padding mismatch (the usual wrong-password
/// symptom) are not told apart.
pub fn open(envelope: &[u8], password: &SecretString) -> Result<Zeroizing<Vec<u8>>> {
    if envelope.len() < HEADER_LENGTH + BLOCK_SIZE || !envelope.starts_with(SALT_MAGIC) {
        return Err(SealError::Decryption);
    }

    let mut salt = [0u8; SALT_LENGTH];
    salt.copy_from_slice(&envelope[SALT_MAGIC.len()..HEADER_LENGTH]);
    let ciphertext = &envelope[HEADER_LENGTH..];
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(SealError::Decryption);
    }

    let derived = derive_key(password.expose_secret().as_bytes(), &salt);
    let cipher = Aes256CbcDec::new_from_slices(derived.key(), derived.iv())
        .map_err(|_| SealError::Decryption)?;

    let mut buffer = Zeroizing::new(ciphertext.to_vec());
    let plaintext_len = cipher
        .decrypt_padded_mut::<Pkcs7>(buffer.as_mut_slice())
        .map_err(|_| SealError::Decryption)?
        .len();
    buffer.truncate(plaintext_len);

    Ok(buffer)
}
