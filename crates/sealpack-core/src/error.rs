//! Error types for sealpack core operations.
//!
//! Every failure an extraction can hit falls into one of a handful of
//! categories. The CLI layer maps each category to an exit code and a
//! single-line message.

use thiserror::Error;

/// Result type alias for sealpack operations.
pub type Result<T> = std::result::Result<T, SealError>;

/// Core error type for sealpack operations.
#[derive(Debug, Error)]
pub enum SealError {
    /// The password could not be obtained (input closed or empty)
    #[error("Password unavailable: {0}")]
    PasswordUnavailable(String),

    /// Wrong password, or a corrupted/truncated/malformed payload.
    ///
    /// Carries no detail; the two causes must stay indistinguishable.
    #[error("invalid password or corrupted package")]
    Decryption,

    /// Decrypted bytes are not a valid compressed archive
    #[error("Unpack error: {0}")]
    Unpack(String),

    /// The output directory already holds files; nothing was touched
    #[error("Output directory {} already exists and is not empty", .0.display())]
    OutputDirOccupied(std::path::PathBuf),

    /// Output directory or temporary file could not be created or written
    #[error("Filesystem error: {0}")]
    Filesystem(String),

    /// Invalid user input (packing side)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Stopped by a signal or Ctrl-C before finishing
    #[error("Interrupted")]
    Interrupted,
}

impl SealError {
    /// Build a filesystem error naming the path involved.
    pub fn filesystem(context: impl std::fmt::Display, err: std::io::Error) -> Self {
        SealError::Filesystem(format!("{}: {}", context, err))
    }
}

impl From<std::io::Error> for SealError {
    fn from(err: std::io::Error) -> Self {
        SealError::Filesystem(err.to_string())
    }
}
