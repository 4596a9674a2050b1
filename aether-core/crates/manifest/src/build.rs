//! Manifest construction: validates every field, sorts `lods`/`files` into
//! canonical order, and computes `artifact_id`/`artifact_hash`.

use std::collections::BTreeMap;

use crate::canonical::{compute_hashes, CanonicalInput};
use crate::errors::ManifestError;
use crate::model::{CoordinateSystem, FileDescriptor, LodDescriptor, Manifest, FALLBACK_KEYS};
use crate::validate;

pub const SCHEMA_VERSION: u32 = 1;

/// Everything needed to build a manifest, in whatever order the caller
/// assembled it. `build` is responsible for sorting, validating, and
/// hashing.
pub struct ManifestDraft {
    pub build_meta: BTreeMap<String, String>,
    pub coordinate_system: CoordinateSystem,
    pub lods: Vec<LodDescriptor>,
    pub files: Vec<FileDescriptor>,
    pub fallbacks: BTreeMap<String, String>,
    pub policy_hash: String,
}

/// Validates every field of a draft manifest against §4.2's invariants.
/// Shared by [`build`] and [`crate::decode::decode`] so both paths enforce
/// exactly the same rules. On success, returns the lods/files sorted into
/// canonical (ascending by `lod_id` / `path`) order.
pub fn validate_draft(
    draft: &ManifestDraft,
) -> Result<(Vec<LodDescriptor>, Vec<FileDescriptor>), ManifestError> {
    for (key, value) in &draft.build_meta {
        validate::validate_text_field(&format!("build_meta.{key}"), value)?;
    }

    validate::validate_unit_scale(draft.coordinate_system.unit_scale)?;

    validate::validate_policy_hash(&draft.policy_hash)?;

    if draft.files.is_empty() {
        return Err(ManifestError::EmptyFiles);
    }
    if draft.lods.is_empty() {
        return Err(ManifestError::EmptyLODs);
    }

    let mut seen_paths: BTreeMap<String, ()> = BTreeMap::new();
    for file in &draft.files {
        validate::validate_path(&file.path)?;
        let lower = file.path.to_ascii_lowercase();
        if seen_paths.insert(lower, ()).is_some() {
            return Err(ManifestError::DuplicatePath {
                path: file.path.clone(),
            });
        }
        validate::validate_sha256_hex(&file.path, &file.sha256)?;
        validate::validate_bytes(&file.path, file.bytes)?;
        validate::validate_content_type(&file.path, &file.content_type)?;
        validate::validate_role(&file.path, &file.role)?;
    }

    let files_by_path: BTreeMap<&str, &FileDescriptor> =
        draft.files.iter().map(|f| (f.path.as_str(), f)).collect();

    for lod in &draft.lods {
        validate::validate_text_field("lod_id", &lod.lod_id)?;
        if !files_by_path.contains_key(lod.entry_file.as_str()) {
            return Err(ManifestError::MissingLODEntryFile {
                lod_id: lod.lod_id.clone(),
                entry_file: lod.entry_file.clone(),
            });
        }
    }

    for (key, path) in &draft.fallbacks {
        if !FALLBACK_KEYS.contains(&key.as_str()) {
            return Err(ManifestError::MissingFallbackFile {
                key: key.clone(),
                path: path.clone(),
            });
        }
        let file = files_by_path.get(path.as_str()).ok_or_else(|| ManifestError::MissingFallbackFile {
            key: key.clone(),
            path: path.clone(),
        })?;
        if file.role != *key {
            return Err(ManifestError::FallbackRoleMismatch {
                key: key.clone(),
                path: path.clone(),
                actual_role: file.role.clone(),
            });
        }
    }

    let mut sorted_lods = draft.lods.clone();
    sorted_lods.sort_by(|a, b| a.lod_id.cmp(&b.lod_id));
    let mut sorted_files = draft.files.clone();
    sorted_files.sort_by(|a, b| a.path.cmp(&b.path));

    Ok((sorted_lods, sorted_files))
}

/// Builds a fresh, fully validated [`Manifest`] from a draft, computing
/// `artifact_id` and `artifact_hash` per §3.
pub fn build(draft: ManifestDraft) -> Result<Manifest, ManifestError> {
    let (sorted_lods, sorted_files) = validate_draft(&draft)?;

    let canonical_input = CanonicalInput {
        schema_version: SCHEMA_VERSION,
        build_meta: &draft.build_meta,
        coordinate_system: &draft.coordinate_system,
        lods: &sorted_lods,
        files: &sorted_files,
        fallbacks: &draft.fallbacks,
        policy_hash: &draft.policy_hash,
    };
    let (artifact_id, artifact_hash) = compute_hashes(&canonical_input);

    Ok(Manifest {
        schema_version: SCHEMA_VERSION,
        artifact_id,
        build_meta: draft.build_meta,
        coordinate_system: draft.coordinate_system,
        lods: sorted_lods,
        files: sorted_files,
        fallbacks: draft.fallbacks,
        policy_hash: draft.policy_hash,
        artifact_hash,
    })
}
