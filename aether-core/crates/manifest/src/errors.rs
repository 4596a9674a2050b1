use thiserror::Error;

/// Every way building or decoding a manifest can fail. Decode-time failures
/// and build-time failures share one closed set so callers only need to
/// match on a single enum regardless of which path produced the manifest.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("manifest JSON is not a well-formed object: {0}")]
    MalformedJson(String),

    #[error("unknown fields present in a closed-world document: {keys:?}")]
    UnknownFields { keys: Vec<String> },

    #[error("unsupported schema_version: {0}")]
    UnsupportedSchemaVersion(String),

    #[error("string field {field} contains a NUL byte")]
    NullByteInString { field: String },

    #[error("string field {field} is not NFC-normalized")]
    NotNFC { field: String },

    #[error("invalid path {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("duplicate path in files: {path}")]
    DuplicatePath { path: String },

    #[error("file {path} has bytes {bytes} outside the allowed [1, 5e9] range")]
    InvalidBytes { path: String, bytes: u64 },

    #[error("file {path} has disallowed content_type {content_type}")]
    InvalidContentType { path: String, content_type: String },

    #[error("file {path} has disallowed role {role}")]
    InvalidRole { path: String, role: String },

    #[error("invalid up_axis: {0}")]
    InvalidUpAxis(String),

    #[error("invalid unit_scale: {0}")]
    InvalidUnitScale(String),

    #[error("files array must not be empty")]
    EmptyFiles,

    #[error("lods array must not be empty")]
    EmptyLODs,

    #[error("lod {lod_id} entry_file {entry_file} is not present in files")]
    MissingLODEntryFile { lod_id: String, entry_file: String },

    #[error("fallback {key} references path {path} which is not present in files")]
    MissingFallbackFile { key: String, path: String },

    #[error("fallback {key} references file {path} with role {actual_role}, expected {key}")]
    FallbackRoleMismatch {
        key: String,
        path: String,
        actual_role: String,
    },

    #[error("invalid sha256 for {path}: {value}")]
    InvalidSHA256 { path: String, value: String },

    #[error("invalid policy_hash: {0}")]
    InvalidPolicyHash(String),

    /// Not named directly in the data model, but required by §4.2's "decoded
    /// manifests MUST re-verify all invariants": a decoded `artifact_hash`
    /// that doesn't match the recomputed canonical hash means the bytes were
    /// hand-edited or corrupted after construction.
    #[error("artifact_hash does not match recomputed canonical hash")]
    ArtifactHashMismatch,
}
