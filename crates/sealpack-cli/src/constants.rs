//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: Decryption failed (wrong password or corrupted package)
/// - 2: Misuse of shell command (clap usage errors)
/// - 3+: Application-specific errors
/// - 130: Interrupted by a signal (128 + SIGINT)
pub mod exit_codes {
    /// Wrong password or corrupted/malformed payload.
    pub const DECRYPTION_FAILED: u8 = 1;

    /// Decrypted bytes were not a valid compressed archive.
    pub const UNPACK_FAILED: u8 = 3;

    /// Output directory or temporary file could not be written.
    pub const FILESYSTEM: u8 = 4;

    /// Password could not be read (input closed or empty).
    pub const PASSWORD_UNAVAILABLE: u8 = 5;

    /// Invalid arguments to the packing tool.
    pub const INVALID_INPUT: u8 = 6;

    /// Stopped by SIGINT, SIGTERM, SIGHUP or Ctrl-C at the prompt.
    pub const INTERRUPTED: u8 = 130;
}

/// File name of the embedded payload inside the asset folder.
pub const PAYLOAD_ASSET: &str = "package.b64";

/// Where `sealpack-pack` writes by default, relative to the workspace root.
pub const DEFAULT_PAYLOAD_OUTPUT: &str = "crates/sealpack-cli/payload/package.b64";
