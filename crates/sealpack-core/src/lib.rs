//! # Sealpack Core
//!
//! Core library for sealpack - a self-extracting, password-protected package.
//!
//! A package is a gzip-compressed tar archive sealed in an OpenSSL-compatible
//! salted AES-256-CBC envelope (PBKDF2 key derivation) and carried as base64
//! text. Only the shared password is needed to unpack it.
//!
//! ## Architecture
//!
//! - **payload**: the base64 text envelope and its fingerprint
//! - **crypto**: key derivation and the salted envelope
//! - **cancel**: cooperative cancellation raised by signal handlers
//! - **archive**: gzip/tar packing and unpacking
//! - **fs**: output directory policy, intermediate archive, staging
//! - **extractor**: the end-to-end extraction lifecycle
//! - **package**: building a payload from a directory

pub mod archive;
pub mod cancel;
pub mod crypto;
pub mod error;
pub mod extractor;
pub mod fs;
pub mod package;
pub mod payload;

pub use cancel::Cancellation;
pub use error::{Result, SealError};
pub use extractor::{
    ExtractionReport, ExtractorConfig, FixedPassword, PackageExtractor, PasswordSource,
};
pub use package::{build_payload, write_payload};
pub use payload::EncryptedPayload;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
