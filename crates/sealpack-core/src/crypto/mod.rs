//! Cryptographic operations for sealpack.
//!
//! The payload is protected with the same construction `openssl enc` uses:
//! - **PBKDF2-HMAC-SHA256**: derives key and IV from the password and an
//!   8-byte salt stored in the envelope
//! - **AES-256-CBC** with PKCS#7 padding
//!
//! ## Threat Model
//!
//! We defend against:
//! - Reading the package contents without the shared password
//! - Using error messages as a password-guessing oracle
//!
//! We do NOT defend against:
//! - Tampering (CBC carries no authentication tag)
//! - Offline brute-force of weak passwords
//! - Compromised OS / keylogger

pub mod envelope;
pub mod key;

pub use envelope::{open, seal, seal_with_salt, SALT_MAGIC};
pub use key::{derive_key, DerivedKey, PBKDF2_ITERATIONS};
