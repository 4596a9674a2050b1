//! Directory-to-manifest equivalence checking (§4.3).

use std::collections::HashSet;
use std::path::Path;

use aether_manifest::Manifest;
use crypto_primitives::{sha256, to_hex};

use crate::enumerate::{check_top_level, enumerate_regular_files};
use crate::errors::PackageError;

/// Validates that `root` is a well-formed artifact package matching
/// `manifest`: the top-level layout, path hygiene, and a byte-for-byte,
/// hash-for-hash equivalence between manifest entries and files on disk.
pub fn validate_package(root: &Path, manifest: &Manifest) -> Result<(), PackageError> {
    let manifest_json_path = root.join("manifest.json");
    if !manifest_json_path.is_file() {
        return Err(PackageError::ManifestFileMissing(root.display().to_string()));
    }

    check_top_level(root)?;

    let mut on_disk: HashSet<String> = enumerate_regular_files(root)?.into_iter().collect();
    on_disk.remove("manifest.json");

    for file in &manifest.files {
        // `file.path` already passed `aether_manifest`'s own construction-time
        // hygiene check (§3), but re-run it here against the exact string this
        // crate is about to join onto a filesystem path, rather than trusting
        // that invariant across a crate boundary.
        if let Err(e) = aether_manifest::validate::validate_path(&file.path) {
            return Err(PackageError::InvalidPackagePath {
                path: file.path.clone(),
                reason: e.to_string(),
            });
        }
        let package_relative = format!("artifacts/{}", file.path);

        if !on_disk.remove(&package_relative) {
            return Err(PackageError::ReferencedFileMissing {
                path: package_relative,
            });
        }

        let disk_path = root.join(&package_relative);
        let metadata = std::fs::symlink_metadata(&disk_path)
            .map_err(|e| PackageError::Io(e.to_string()))?;
        if metadata.file_type().is_symlink() {
            return Err(PackageError::SymlinkNotAllowed {
                path: package_relative,
            });
        }

        let actual_bytes = metadata.len();
        if actual_bytes != file.bytes {
            return Err(PackageError::SizeMismatch {
                path: package_relative,
                expected: file.bytes,
                actual: actual_bytes,
            });
        }

        let contents = std::fs::read(&disk_path).map_err(|e| PackageError::Io(e.to_string()))?;
        let actual_hash = to_hex(&sha256(&contents));
        if actual_hash != file.sha256 {
            return Err(PackageError::HashMismatch {
                path: package_relative,
                expected: file.sha256.clone(),
                actual: actual_hash,
            });
        }
    }

    if let Some(unreferenced) = on_disk.into_iter().next() {
        return Err(PackageError::UnreferencedFile { path: unreferenced });
    }

    Ok(())
}
