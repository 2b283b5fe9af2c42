//! Filesystem scoping for an extraction: the output directory, the
//! intermediate archive file, and the staging area.

use std::fs::{self, File};
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{Result, SealError};

const STAGING_PREFIX: &str = ".sealpack-staging-";

/// How the output directory was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputDirState {
    /// Did not exist and was created
    Created,
    /// Already existed and was empty
    ReusedEmpty,
}

/// Create the output directory, or accept an existing empty one.
///
/// Staging directories left behind by a run that was killed outright are
/// removed first; they never hold anything but a partial unpack.
///
/// # Errors
///
/// Returns `SealError::OutputDirOccupied` for a non-empty directory, and
/// `SealError::Filesystem` if the path is not a directory or cannot be
/// created.
pub fn prepare_output_dir(path: &Path) -> Result<OutputDirState> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => {
            purge_stale_staging(path)?;
            let mut entries = fs::read_dir(path)
                .map_err(|e| SealError::filesystem(format!("Failed to read {}", path.display()), e))?;
            if entries.next().is_some() {
                return Err(SealError::OutputDirOccupied(path.to_path_buf()));
            }
            Ok(OutputDirState::ReusedEmpty)
        }
        Ok(_) => Err(SealError::Filesystem(format!(
            "Output path {} exists and is not a directory",
            path.display()
        ))),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            fs::create_dir(path).map_err(|e| {
                SealError::filesystem(format!("Failed to create {}", path.display()), e)
            })?;
            Ok(OutputDirState::Created)
        }
        Err(err) => Err(SealError::filesystem(
            format!("Failed to inspect {}", path.display()),
            err,
        )),
    }
}

fn purge_stale_staging(dir: &Path) -> Result<()> {
    let entries = fs::read_dir(dir)
        .map_err(|e| SealError::filesystem(format!("Failed to read {}", dir.display()), e))?;

    for entry in entries {
        let entry =
            entry.map_err(|e| SealError::filesystem(format!("Failed to read {}", dir.display()), e))?;
        let is_staging = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(STAGING_PREFIX));
        // file_type() does not follow symlinks
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !(is_staging && is_dir) {
            continue;
        }

        let stale = entry.path();
        fs::remove_dir_all(&stale).map_err(|e| {
            SealError::filesystem(format!("Failed to remove {}", stale.display()), e)
        })?;
        warn!(path = %stale.display(), "removed staging directory left by an interrupted run");
    }
    Ok(())
}

/// The decrypted archive materialized on disk for the duration of an unpack.
///
/// The file is unlinked from the moment it is created, so it never has a
/// name in `dir` and the kernel reclaims it when the handle closes, even if
/// the process is killed.
#[derive(Debug)]
pub struct IntermediateArchive {
    file: File,
}

impl IntermediateArchive {
    /// Write `bytes` to a fresh anonymous file on the filesystem of `dir`.
    pub fn materialize(dir: &Path, bytes: &[u8]) -> Result<Self> {
        let mut file = tempfile::tempfile_in(dir).map_err(|e| {
            SealError::filesystem(
                format!("Failed to create temporary archive in {}", dir.display()),
                e,
            )
        })?;

        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|e| SealError::filesystem("Failed to write temporary archive", e))?;

        debug!(dir = %dir.display(), bytes = bytes.len(), "materialized archive");
        Ok(Self { file })
    }

    /// The archive, rewound to its first byte.
    pub fn reader(&mut self) -> Result<&mut File> {
        self.file
            .rewind()
            .map_err(|e| SealError::filesystem("Failed to rewind temporary archive", e))?;
        Ok(&mut self.file)
    }

    /// Discard the contents and release the file.
    pub fn cleanup(self) {
        if let Err(err) = self.file.set_len(0) {
            debug!(error = %err, "could not truncate temporary archive");
        }
        drop(self.file);
        debug!("released temporary archive");
    }
}

/// Create a hidden staging directory inside `dir`; removed on drop.
pub fn staging_dir(dir: &Path) -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(dir)
        .map_err(|e| {
            SealError::filesystem(
                format!("Failed to create staging directory in {}", dir.display()),
                e,
            )
        })
}

/// Atomically rename a file, with fallback for platforms where rename fails if target exists.
///
/// If the rename ultimately fails, the temp file is cleaned up.
pub fn rename_with_fallback(temp_path: &Path, destination: &Path) -> std::io::Result<()> {
    if let Err(initial_err) = fs::rename(temp_path, destination) {
        // Best-effort replace on platforms where rename fails if target exists.
        let _ = fs::remove_file(destination);
        fs::rename(temp_path, destination).map_err(|retry_err| {
            let _ = fs::remove_file(temp_path);
            std::io::Error::new(
                retry_err.kind(),
                format!(
                    "Atomic rename failed (initial: {}, retry: {})",
                    initial_err, retry_err
                ),
            )
        })?;
    }
    Ok(())
}

/// Move every top-level entry of `staging` into `target`.
///
/// Refuses to replace anything already present in `target`.
pub fn promote_entries(staging: &Path, target: &Path) -> Result<Vec<PathBuf>> {
    let mut promoted = Vec::new();
    let entries = fs::read_dir(staging)
        .map_err(|e| SealError::filesystem(format!("Failed to read {}", staging.display()), e))?;

    for entry in entries {
        let entry = entry
            .map_err(|e| SealError::filesystem(format!("Failed to read {}", staging.display()), e))?;
        let destination = target.join(entry.file_name());
        if fs::symlink_metadata(&destination).is_ok() {
            return Err(SealError::Filesystem(format!(
                "Refusing to overwrite {}",
                destination.display()
            )));
        }
        fs::rename(entry.path(), &destination).map_err(|e| {
            SealError::filesystem(format!("Failed to move into {}", destination.display()), e)
        })?;
        promoted.push(destination);
    }

    Ok(promoted)
}
