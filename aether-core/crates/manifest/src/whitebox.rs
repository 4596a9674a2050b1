//! The secondary "whitebox" manifest variant (§4.2): a minimal, line-based
//! hash scheme used where a full canonical-JSON manifest is unavailable —
//! e.g. verifying a package whose `manifest.json` was stripped but whose
//! file list and policy hash are known out of band.
//!
//! `artifact_hash` here is `SHA256("A3D_ARTIFACT_V1\n" ++ policy_hash ++
//! "\n" ++ schema_version ++ "\n" ++ file_count ++ "\n" ++
//! Σ(path ++ "\n" ++ sha256 ++ "\n"))` over path-sorted files, and
//! `artifact_id` is the first 8 hex characters of that hash. It shares no
//! code with the canonical encoder by design: it exists specifically for
//! contexts that cannot run a JSON parser.

use crypto_primitives::{sha256, to_hex};

use crate::build::SCHEMA_VERSION;
use crate::errors::ManifestError;
use crate::validate;

const WHITEBOX_MAGIC: &str = "A3D_ARTIFACT_V1\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhiteboxFile {
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhiteboxManifest {
    pub schema_version: u32,
    pub artifact_id: String,
    pub artifact_hash: String,
    pub policy_hash: String,
    pub files: Vec<WhiteboxFile>,
}

/// Builds a whitebox manifest from a policy hash and an unordered file
/// list, sorting by path before hashing.
pub fn build_whitebox(policy_hash: &str, mut files: Vec<WhiteboxFile>) -> Result<WhiteboxManifest, ManifestError> {
    validate::validate_policy_hash(policy_hash)?;
    if files.is_empty() {
        return Err(ManifestError::EmptyFiles);
    }
    for file in &files {
        validate::validate_path(&file.path)?;
        validate::validate_sha256_hex(&file.path, &file.sha256)?;
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let mut buf = String::new();
    buf.push_str(WHITEBOX_MAGIC);
    buf.push_str(policy_hash);
    buf.push('\n');
    buf.push_str(&SCHEMA_VERSION.to_string());
    buf.push('\n');
    buf.push_str(&files.len().to_string());
    buf.push('\n');
    for file in &files {
        buf.push_str(&file.path);
        buf.push('\n');
        buf.push_str(&file.sha256);
        buf.push('\n');
    }

    let digest = sha256(buf.as_bytes());
    let artifact_hash = to_hex(&digest);
    let artifact_id = artifact_hash[..8].to_string();

    Ok(WhiteboxManifest {
        schema_version: SCHEMA_VERSION,
        artifact_id,
        artifact_hash,
        policy_hash: policy_hash.to_string(),
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitebox_hash_is_order_independent() {
        let policy_hash = "a".repeat(64);
        let files_a = vec![
            WhiteboxFile {
                path: "b.ply".to_string(),
                sha256: "1".repeat(64),
            },
            WhiteboxFile {
                path: "a.ply".to_string(),
                sha256: "2".repeat(64),
            },
        ];
        let files_b = vec![
            WhiteboxFile {
                path: "a.ply".to_string(),
                sha256: "2".repeat(64),
            },
            WhiteboxFile {
                path: "b.ply".to_string(),
                sha256: "1".repeat(64),
            },
        ];
        let a = build_whitebox(&policy_hash, files_a).unwrap();
        let b = build_whitebox(&policy_hash, files_b).unwrap();
        assert_eq!(a.artifact_hash, b.artifact_hash);
        assert_eq!(a.artifact_id.len(), 8);
    }

    #[test]
    fn test_whitebox_hash_changes_with_any_file_content_change() {
        let policy_hash = "a".repeat(64);
        let files_a = vec![WhiteboxFile {
            path: "a.ply".to_string(),
            sha256: "1".repeat(64),
        }];
        let files_b = vec![WhiteboxFile {
            path: "a.ply".to_string(),
            sha256: "2".repeat(64),
        }];
        let a = build_whitebox(&policy_hash, files_a).unwrap();
        let b = build_whitebox(&policy_hash, files_b).unwrap();
        assert_ne!(a.artifact_hash, b.artifact_hash);
    }

    #[test]
    fn test_whitebox_rejects_empty_files() {
        let policy_hash = "a".repeat(64);
        assert_eq!(build_whitebox(&policy_hash, vec![]).unwrap_err(), ManifestError::EmptyFiles);
    }
}
