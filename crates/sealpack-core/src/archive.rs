//! Gzip-compressed tar handling.

use std::io::Read;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;

use crate::error::{Result, SealError};

/// What an unpack wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnpackReport {
    /// Relative paths of every unpacked entry, in archive order
    pub entries: Vec<PathBuf>,
    /// Number of regular files among them
    pub files: usize,
}

/// Unpack a gzip-compressed tar stream into `dest`.
///
/// Relative paths and permission bits are kept as stored in the archive.
///
/// # Errors
///
/// Returns `SealError::Unpack` if the stream is not valid gzip/tar, holds no
/// entries, or contains an entry that would land outside `dest`.
pub fn unpack<R: Read>(reader: R, dest: &Path) -> Result<UnpackReport> {
    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    archive.set_preserve_permissions(true);
    archive.set_overwrite(false);

    let mut report = UnpackReport::default();
    let entries = archive
        .entries()
        .map_err(|e| SealError::Unpack(format!("Failed to read archive entries: {}", e)))?;

    for entry in entries {
        let mut entry =
            entry.map_err(|e| SealError::Unpack(format!("Failed to read archive entry: {}", e)))?;
        let raw_path = entry
            .path()
            .map_err(|e| SealError::Unpack(format!("Invalid entry path: {}", e)))?
            .into_owned();
        let relative = contained_path(&raw_path).ok_or_else(|| {
            SealError::Unpack(format!(
                "Entry escapes the output directory: {}",
                raw_path.display()
            ))
        })?;

        if relative.as_os_str().is_empty() {
            // The archive root ("./") maps onto dest itself.
            continue;
        }

        let is_file = entry.header().entry_type().is_file();
        let unpacked = entry.unpack_in(dest).map_err(|e| {
            SealError::Unpack(format!("Failed to unpack {}: {}", relative.display(), e))
        })?;
        if !unpacked {
            return Err(SealError::Unpack(format!(
                "Refused to unpack {}",
                relative.display()
            )));
        }

        debug!(entry = %relative.display(), "unpacked archive entry");
        if is_file {
            report.files += 1;
        }
        report.entries.push(relative);
    }

    if report.entries.is_empty() {
        return Err(SealError::Unpack("Archive contains no entries".to_string()));
    }

    Ok(report)
}

/// Build a gzip-compressed tar of everything under `source`.
///
/// Entry paths are relative to `source`; the directory itself is not stored.
pub fn pack_dir(source: &Path) -> Result<Vec<u8>> {
    if !source.is_dir() {
        return Err(SealError::InvalidInput(format!(
            "Not a directory: {}",
            source.display()
        )));
    }

    let encoder = GzEncoder::new(Vec::new(), Compression::best());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);
    builder
        .append_dir_all("", source)
        .map_err(|e| SealError::filesystem(format!("Failed to archive {}", source.display()), e))?;

    let encoder = builder
        .into_inner()
        .map_err(|e| SealError::filesystem("Failed to finish archive", e))?;
    encoder
        .finish()
        .map_err(|e| SealError::filesystem("Failed to compress archive", e))
}

/// Normalize an entry path, or `None` if it is absolute or climbs out.
fn contained_path(path: &Path) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::tempdir;

    fn sample_tree(root: &Path) {
        fs::create_dir_all(root.join("config")).unwrap();
        fs::write(root.join("run.sh"), b"#!/bin/sh\necho ok\n").unwrap();
        fs::write(root.join("config").join("endpoints.conf"), b"SAE_A=1\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(root.join("run.sh"), fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    #[test]
    fn test_pack_then_unpack_preserves_tree() {
        let source = tempdir().unwrap();
        sample_tree(source.path());
        let dest = tempdir().unwrap();

        let archive = pack_dir(source.path()).unwrap();
        let report = unpack(archive.as_slice(), dest.path()).unwrap();

        assert_eq!(report.files, 2);
        assert!(report.entries.contains(&PathBuf::from("config/endpoints.conf")));
        assert_eq!(
            fs::read(dest.path().join("config/endpoints.conf")).unwrap(),
            b"SAE_A=1\n"
        );
        assert_eq!(
            fs::read(dest.path().join("run.sh")).unwrap(),
            b"#!/bin/sh\necho ok\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_unpack_preserves_mode() {
        use std::os::unix::fs::PermissionsExt;

        let source = tempdir().unwrap();
        sample_tree(source.path());
        let dest = tempdir().unwrap();

        let archive = pack_dir(source.path()).unwrap();
        unpack(archive.as_slice(), dest.path()).unwrap();

        let mode = fs::metadata(dest.path().join("run.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_garbage_is_unpack_error() {
        let dest = tempdir().unwrap();
        let result = unpack(&b"definitely not a gzip stream"[..], dest.path());
        assert!(matches!(result, Err(SealError::Unpack(_))));
    }

    #[test]
    fn test_empty_input_is_unpack_error() {
        let dest = tempdir().unwrap();
        let result = unpack(&b""[..], dest.path());
        assert!(matches!(result, Err(SealError::Unpack(_))));
    }

    #[test]
    fn test_gzip_of_non_tar_is_unpack_error() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&[0x5A; 700]).unwrap();
        let gz = encoder.finish().unwrap();

        let dest = tempdir().unwrap();
        let result = unpack(gz.as_slice(), dest.path());
        assert!(matches!(result, Err(SealError::Unpack(_))));
    }

    #[test]
    fn test_pack_rejects_missing_source() {
        let dir = tempdir().unwrap();
        let result = pack_dir(&dir.path().join("missing"));
        assert!(matches!(result, Err(SealError::InvalidInput(_))));
    }

    #[test]
    fn test_contained_path() {
        assert_eq!(
            contained_path(Path::new("./config/a.conf")),
            Some(PathBuf::from("config/a.conf"))
        );
        assert_eq!(contained_path(Path::new("./")), Some(PathBuf::new()));
        assert_eq!(contained_path(Path::new("../escape")), None);
        assert_eq!(contained_path(Path::new("/etc/passwd")), None);
    }
}
