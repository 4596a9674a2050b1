//! Traversal-safe enumeration of a package directory.
//!
//! Symbolic links are never followed or accepted — not at the top level,
//! not anywhere in `artifacts/`. This is the boundary where a malicious or
//! corrupted package directory meets the rest of the validator, so it
//! rejects eagerly rather than silently walking into something outside the
//! package root.

use std::path::Path;

use walkdir::WalkDir;

use crate::errors::PackageError;

const CRUFT_NAMES: &[&str] = &["__MACOSX", ".DS_Store", "Thumbs.db"];

fn is_hidden_or_cruft(basename: &str) -> bool {
    basename.starts_with('.') || basename.starts_with("._") || CRUFT_NAMES.contains(&basename)
}

fn to_package_relative(path: &Path, root: &Path) -> Result<String, PackageError> {
    let rel = path.strip_prefix(root).map_err(|_| PackageError::Io(format!(
        "{} is not under package root",
        path.display()
    )))?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Lists every regular file under `root` (recursively), rejecting symlinks
/// and hidden/cruft entries anywhere in the tree. Returns package-relative
/// paths with `/` separators.
pub fn enumerate_regular_files(root: &Path) -> Result<Vec<String>, PackageError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).into_iter() {
        let entry = entry.map_err(|e| PackageError::Io(e.to_string()))?;
        if entry.path() == root {
            continue;
        }
        let basename = entry.file_name().to_string_lossy().into_owned();
        let rel = to_package_relative(entry.path(), root)?;

        if entry.path_is_symlink() {
            return Err(PackageError::SymlinkNotAllowed { path: rel });
        }
        if is_hidden_or_cruft(&basename) {
            return Err(PackageError::HiddenOrCruftEntry { path: rel });
        }
        if entry.file_type().is_file() {
            files.push(rel);
        }
    }

    Ok(files)
}

/// Checks that the top-level contents of `root` are exactly
/// `{manifest.json, artifacts/}`, rejecting symlinks and hidden/cruft
/// entries at that level before the comparison.
pub fn check_top_level(root: &Path) -> Result<(), PackageError> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(root).map_err(|e| PackageError::Io(e.to_string()))? {
        let entry = entry.map_err(|e| PackageError::Io(e.to_string()))?;
        let basename = entry.file_name().to_string_lossy().into_owned();
        let file_type = entry
            .file_type()
            .map_err(|e| PackageError::Io(e.to_string()))?;
        if file_type.is_symlink() {
            return Err(PackageError::SymlinkNotAllowed { path: basename });
        }
        if is_hidden_or_cruft(&basename) {
            return Err(PackageError::HiddenOrCruftEntry { path: basename });
        }
        found.push(basename);
    }
    found.sort();
    let expected = {
        let mut v = vec!["artifacts".to_string(), "manifest.json".to_string()];
        v.sort();
        v
    };
    if found != expected {
        return Err(PackageError::TopLevelMismatch { found });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_check_top_level_accepts_exact_layout() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("manifest.json"), b"{}").unwrap();
        fs::create_dir(dir.path().join("artifacts")).unwrap();
        assert!(check_top_level(dir.path()).is_ok());
    }

    #[test]
    fn test_check_top_level_rejects_extra_entry() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("manifest.json"), b"{}").unwrap();
        fs::create_dir(dir.path().join("artifacts")).unwrap();
        fs::write(dir.path().join("readme.txt"), b"hi").unwrap();
        assert!(matches!(
            check_top_level(dir.path()).unwrap_err(),
            PackageError::TopLevelMismatch { .. }
        ));
    }

    #[test]
    fn test_check_top_level_rejects_ds_store() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("manifest.json"), b"{}").unwrap();
        fs::create_dir(dir.path().join("artifacts")).unwrap();
        fs::write(dir.path().join(".DS_Store"), b"junk").unwrap();
        assert!(matches!(
            check_top_level(dir.path()).unwrap_err(),
            PackageError::HiddenOrCruftEntry { .. }
        ));
    }

    #[test]
    fn test_enumerate_regular_files_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("artifacts/lod0")).unwrap();
        fs::write(dir.path().join("artifacts/lod0/mesh.ply"), b"data").unwrap();
        let files = enumerate_regular_files(dir.path()).unwrap();
        assert_eq!(files, vec!["artifacts/lod0/mesh.ply".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_enumerate_regular_files_rejects_symlink() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("artifacts")).unwrap();
        fs::write(dir.path().join("real.ply"), b"data").unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("real.ply"),
            dir.path().join("artifacts/link.ply"),
        )
        .unwrap();
        assert!(matches!(
            enumerate_regular_files(dir.path()).unwrap_err(),
            PackageError::SymlinkNotAllowed { .. }
        ));
    }
}
