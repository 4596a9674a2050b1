use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("{0}/manifest.json does not exist or is not a regular file")]
    ManifestFileMissing(String),

    #[error("symbolic link is not allowed at {path}")]
    SymlinkNotAllowed { path: String },

    #[error("hidden or cruft entry is not allowed: {path}")]
    HiddenOrCruftEntry { path: String },

    #[error("top-level package contents must be exactly {{manifest.json, artifacts/}}, found {found:?}")]
    TopLevelMismatch { found: Vec<String> },

    #[error("manifest references {path} but it is missing from the package")]
    ReferencedFileMissing { path: String },

    #[error("file {path} is {actual} bytes, manifest declares {expected}")]
    SizeMismatch {
        path: String,
        expected: u64,
        actual: u64,
    },

    #[error("file {path} has sha256 {actual}, manifest declares {expected}")]
    HashMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("file {path} is present on disk but not referenced by the manifest")]
    UnreferencedFile { path: String },

    #[error("package-relative path {path} is invalid: {reason}")]
    InvalidPackagePath { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("manifest decode failed: {0}")]
    ManifestDecode(#[from] aether_manifest::ManifestError),
}
