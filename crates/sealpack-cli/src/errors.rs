//! CLI error types for structured error handling.
//!
//! Maps core error categories to exit codes and single-line messages.

use std::fmt;
use std::process::ExitCode;

use sealpack_core::SealError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Password could not be obtained
    PasswordUnavailable(String),

    /// Wrong password or corrupted package (never more specific)
    DecryptionFailed,

    /// Decrypted data was not a valid archive
    UnpackFailed(String),

    /// The output directory exists and already holds files
    OutputDirOccupied(String),

    /// Filesystem problem, carrying the OS reason
    Filesystem(String),

    /// Invalid user input
    InvalidInput(String),

    /// Stopped by a signal before finishing
    Interrupted,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::PasswordUnavailable(message) => {
                write!(f, "Could not read password: {}", message)
            }
            CliError::DecryptionFailed => write!(f, "invalid password or corrupted package"),
            CliError::UnpackFailed(message) => {
                write!(f, "Package could not be unpacked: {}", message)
            }
            CliError::OutputDirOccupied(path) => {
                write!(f, "Output directory {} already exists and is not empty", path)
            }
            CliError::Filesystem(message) => write!(f, "{}", message),
            CliError::InvalidInput(message) => write!(f, "{}", message),
            CliError::Interrupted => write!(f, "Interrupted"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<SealError> for CliError {
    fn from(err: SealError) -> Self {
        match err {
            SealError::PasswordUnavailable(message) => CliError::PasswordUnavailable(message),
            SealError::Decryption => CliError::DecryptionFailed,
            SealError::Unpack(message) => CliError::UnpackFailed(message),
            SealError::OutputDirOccupied(path) => {
                CliError::OutputDirOccupied(path.display().to_string())
            }
            SealError::Filesystem(message) => CliError::Filesystem(message),
            SealError::InvalidInput(message) => CliError::InvalidInput(message),
            SealError::Interrupted => CliError::Interrupted,
        }
    }
}

impl CliError {
    /// Get the exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::PasswordUnavailable(_) => exit_codes::PASSWORD_UNAVAILABLE,
            CliError::DecryptionFailed => exit_codes::DECRYPTION_FAILED,
            CliError::UnpackFailed(_) => exit_codes::UNPACK_FAILED,
            CliError::OutputDirOccupied(_) | CliError::Filesystem(_) => exit_codes::FILESYSTEM,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::Interrupted => exit_codes::INTERRUPTED,
        }
    }

    /// Short machine-readable category for JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            CliError::PasswordUnavailable(_) => "password_unavailable",
            CliError::DecryptionFailed => "decryption_failed",
            CliError::UnpackFailed(_) => "unpack_failed",
            CliError::OutputDirOccupied(_) => "output_dir_not_empty",
            CliError::Filesystem(_) => "filesystem",
            CliError::InvalidInput(_) => "invalid_input",
            CliError::Interrupted => "interrupted",
        }
    }

    /// Process exit status for this error.
    ///
    /// Returned from `main` rather than calling `process::exit`, so scoped
    /// resources (temporary files, terminal state) are released first.
    pub fn exit_status(&self) -> ExitCode {
        ExitCode::from(self.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decryption_is_generic() {
        let err = CliError::from(SealError::Decryption);
        assert_eq!(err.to_string(), "invalid password or corrupted package");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            CliError::PasswordUnavailable(String::new()).exit_code(),
            CliError::DecryptionFailed.exit_code(),
            CliError::UnpackFailed(String::new()).exit_code(),
            CliError::Filesystem(String::new()).exit_code(),
            CliError::InvalidInput(String::new()).exit_code(),
            CliError::Interrupted.exit_code(),
        ];
        for (i, code) in codes.iter().enumerate() {
            assert_ne!(*code, 0);
            assert_ne!(*code, 2);
            assert!(!codes[i + 1..].contains(code));
        }
    }

    #[test]
    fn test_filesystem_keeps_os_reason() {
        let err = CliError::from(SealError::Filesystem(
            "Failed to create pkg: Permission denied (os error 13)".to_string(),
        ));
        assert!(err.to_string().contains("Permission denied"));
        assert_eq!(err.kind(), "filesystem");
    }

    #[test]
    fn test_occupied_output_dir_is_a_filesystem_failure() {
        let err = CliError::from(SealError::OutputDirOccupied(
            std::path::PathBuf::from("multi_sae_test_package"),
        ));
        assert_eq!(err.exit_code(), exit_codes::FILESYSTEM);
        assert_eq!(err.kind(), "output_dir_not_empty");
        assert_eq!(
            err.to_string(),
            "Output directory multi_sae_test_package already exists and is not empty"
        );
    }

    #[test]
    fn test_interrupted_uses_signal_exit_code() {
        let err = CliError::from(SealError::Interrupted);
        assert_eq!(err.exit_code(), 130);
        assert_eq!(err.kind(), "interrupted");
    }
}
