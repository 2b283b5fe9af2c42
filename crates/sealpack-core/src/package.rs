//! Building a package payload from a directory.

use std::fs;
use std::path::Path;

use secrecy::SecretString;
use tracing::info;

use crate::archive::pack_dir;
use crate::crypto::seal;
use crate::error::{Result, SealError};
use crate::fs::rename_with_fallback;
use crate::payload::EncryptedPayload;

/// Archive, compress and seal everything under `source`.
pub fn build_payload(source: &Path, password: &SecretString) -> Result<EncryptedPayload> {
    let archive = pack_dir(source)?;
    let envelope = seal(&archive, password)?;
    let payload = EncryptedPayload::encode(&envelope);

    info!(
        source = %source.display(),
        archive_bytes = archive.len(),
        payload_bytes = payload.len(),
        fingerprint = %payload.fingerprint(),
        "built package payload"
    );
    Ok(payload)
}

/// Write `payload` to `path`, replacing it only when `force` is set.
pub fn write_payload(path: &Path, payload: &EncryptedPayload, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(SealError::InvalidInput(format!(
            "Payload already exists: {} (use --force to replace it)",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            SealError::filesystem(format!("Failed to create {}", parent.display()), e)
        })?;
    }

    let temp_path = path.with_extension("b64.tmp");
    fs::write(&temp_path, payload.as_bytes()).map_err(|e| {
        SealError::filesystem(format!("Failed to write {}", temp_path.display()), e)
    })?;
    rename_with_fallback(&temp_path, path)
        .map_err(|e| SealError::filesystem(format!("Failed to replace {}", path.display()), e))
}
