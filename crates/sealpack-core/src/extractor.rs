//! The extraction lifecycle: prepare the output directory, obtain the
//! password, decrypt the payload, unpack it, clean up.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::archive::{self, UnpackReport};
use crate::cancel::Cancellation;
use crate::crypto;
use crate::error::{Result, SealError};
use crate::fs::{self as seal_fs, IntermediateArchive, OutputDirState};
use crate::payload::EncryptedPayload;

/// Directory the package unpacks into, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "multi_sae_test_package";

/// Script inside the package that runs the unpacked suite.
pub const DEFAULT_ENTRY_POINT: &str = "multi_sae_test.sh";

/// Where a password comes from.
///
/// Implementations must never log or persist the secret.
pub trait PasswordSource {
    /// Obtain the password, blocking if the source is interactive.
    fn acquire(&mut self) -> Result<SecretString>;
}

/// A password handed over up front (command-line argument).
pub struct FixedPassword {
    password: Option<SecretString>,
}

impl FixedPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: Some(SecretString::from(password.into())),
        }
    }
}

impl PasswordSource for FixedPassword {
    fn acquire(&mut self) -> Result<SecretString> {
        let password = self.password.take().ok_or_else(|| {
            SealError::PasswordUnavailable("Password was already consumed".to_string())
        })?;
        ensure_non_empty(password)
    }
}

/// Reject empty passwords; anything else is attempted as-is.
pub fn ensure_non_empty(password: SecretString) -> Result<SecretString> {
    if password.expose_secret().is_empty() {
        return Err(SealError::PasswordUnavailable(
            "Password must not be empty".to_string(),
        ));
    }
    Ok(password)
}

/// Where and what to extract.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Directory the output directory is created in
    pub work_dir: PathBuf,
    /// Name of the output directory
    pub output_dir_name: String,
    /// Entry point script reported after a successful extraction
    pub entry_point: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            output_dir_name: DEFAULT_OUTPUT_DIR.to_string(),
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
        }
    }
}

impl ExtractorConfig {
    /// Use `work_dir` instead of the current directory.
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    /// Full path of the output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.work_dir.join(&self.output_dir_name)
    }
}

/// Outcome of a successful extraction.
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    pub output_dir: PathBuf,
    pub output_dir_state: OutputDirState,
    pub entry_point: PathBuf,
    pub entry_point_present: bool,
    pub unpacked: UnpackReport,
}

/// Decode and decrypt `payload` into archive bytes.
///
/// # Errors
///
/// Every failure (malformed base64, bad envelope, wrong password) is the
/// same `SealError::Decryption`.
pub fn decrypt(
    payload: &EncryptedPayload,
    password: &SecretString,
) -> Result<Zeroizing<Vec<u8>>> {
    let envelope = payload.decode()?;
    crypto::open(&envelope, password)
}

/// Unpack `archive_bytes` into `dest` through an on-disk intermediate archive.
///
/// Entries are staged first and only moved into `dest` once the whole
/// archive unpacked, so a failure leaves `dest` as it was. The intermediate
/// archive is released whether unpacking succeeded or not.
pub fn unpack(archive_bytes: &[u8], dest: &Path) -> Result<UnpackReport> {
    unpack_cancellable(archive_bytes, dest, &Cancellation::new())
}

/// [`unpack`], abandoned with `SealError::Interrupted` once `cancellation`
/// fires. Nothing is promoted into `dest` after that point.
pub fn unpack_cancellable(
    archive_bytes: &[u8],
    dest: &Path,
    cancellation: &Cancellation,
) -> Result<UnpackReport> {
    let mut intermediate = IntermediateArchive::materialize(dest, archive_bytes)?;
    let staging = seal_fs::staging_dir(dest)?;

    let unpacked = intermediate
        .reader()
        .and_then(|file| archive::unpack(cancellation.reader(file), staging.path()));
    cleanup(intermediate);
    let report = unpacked.map_err(|err| {
        if cancellation.is_cancelled() {
            SealError::Interrupted
        } else {
            err
        }
    })?;

    cancellation.check()?;
    seal_fs::promote_entries(staging.path(), dest)?;
    staging
        .close()
        .map_err(|e| SealError::filesystem("Failed to remove staging directory", e))?;

    Ok(report)
}

/// Release the intermediate archive.
pub fn cleanup(intermediate: IntermediateArchive) {
    intermediate.cleanup();
}

/// Drives one extraction of an embedded payload.
pub struct PackageExtractor {
    payload: EncryptedPayload,
    config: ExtractorConfig,
    cancellation: Cancellation,
}

impl PackageExtractor {
    pub fn new(payload: EncryptedPayload, config: ExtractorConfig) -> Self {
        Self {
            payload,
            config,
            cancellation: Cancellation::new(),
        }
    }

    /// Stop at the next checkpoint once `cancellation` fires.
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn payload(&self) -> &EncryptedPayload {
        &self.payload
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Create (or accept an empty) output directory.
    pub fn prepare_output_dir(&self) -> Result<OutputDirState> {
        seal_fs::prepare_output_dir(&self.config.output_dir())
    }

    /// Decrypt the embedded payload.
    pub fn decrypt(&self, password: &SecretString) -> Result<Zeroizing<Vec<u8>>> {
        decrypt(&self.payload, password)
    }

    /// Unpack decrypted archive bytes into the output directory.
    pub fn unpack(&self, archive_bytes: &[u8]) -> Result<UnpackReport> {
        unpack_cancellable(archive_bytes, &self.config.output_dir(), &self.cancellation)
    }

    /// Release an intermediate archive.
    pub fn cleanup(&self, intermediate: IntermediateArchive) {
        cleanup(intermediate)
    }

    /// Run the full sequence with a password from `source`.
    pub fn extract(&self, source: &mut dyn PasswordSource) -> Result<ExtractionReport> {
        let output_dir = self.config.output_dir();

        let output_dir_state = self.prepare_output_dir()?;
        debug!(
            path = %output_dir.display(),
            state = ?output_dir_state,
            "output directory ready"
        );

        let password = source.acquire()?;
        self.cancellation.check()?;

        debug!(
            payload_bytes = self.payload.len(),
            algorithm = EncryptedPayload::ALGORITHM,
            kdf = EncryptedPayload::KDF,
            "decrypting payload"
        );
        let archive_bytes = self.decrypt(&password)?;
        drop(password);
        self.cancellation.check()?;

        let unpacked = self.unpack(&archive_bytes)?;
        info!(
            path = %output_dir.display(),
            entries = unpacked.entries.len(),
            files = unpacked.files,
            "package extracted"
        );

        let entry_point = output_dir.join(&self.config.entry_point);
        let entry_point_present = entry_point.is_file();
        if !entry_point_present {
            debug!(entry_point = %entry_point.display(), "entry point missing from package");
        }

        Ok(ExtractionReport {
            output_dir,
            output_dir_state,
            entry_point,
            entry_point_present,
            unpacked,
        })
    }
}
