//! Strict, closed-world JSON decode of an on-disk manifest.
//!
//! Closed-world means every key present in the document must be a key this
//! schema version knows about — anywhere in the tree, not just at the top
//! level. Unknown keys are collected (not just the first one found) and
//! reported together, because a caller debugging a manifest produced by a
//! newer schema version wants the whole list, not one key at a time.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::build::{validate_draft, ManifestDraft, SCHEMA_VERSION};
use crate::canonical::{compute_hashes, CanonicalInput};
use crate::errors::ManifestError;
use crate::model::{CoordinateSystem, FileDescriptor, LodDescriptor, Manifest, QualityTier, UpAxis};

const TOP_LEVEL_KEYS: &[&str] = &[
    "schema_version",
    "artifact_id",
    "build_meta",
    "coordinate_system",
    "lods",
    "files",
    "fallbacks",
    "policy_hash",
    "artifact_hash",
];
const COORDINATE_SYSTEM_KEYS: &[&str] = &["up_axis", "unit_scale"];
const LOD_KEYS: &[&str] = &["lod_id", "quality_tier", "approx_splat_count", "entry_file"];
const FILE_KEYS: &[&str] = &["path", "sha256", "bytes", "content_type", "role"];

fn push_unknown(object: &Value, known: &[&str], path_prefix: &str, out: &mut Vec<String>) {
    if let Value::Object(map) = object {
        for key in map.keys() {
            if !known.contains(&key.as_str()) {
                out.push(format!("{path_prefix}{key}"));
            }
        }
    }
}

fn collect_unknown_fields(value: &Value) -> Vec<String> {
    let mut unknown = Vec::new();
    push_unknown(value, TOP_LEVEL_KEYS, "", &mut unknown);

    if let Some(cs) = value.get("coordinate_system") {
        push_unknown(cs, COORDINATE_SYSTEM_KEYS, "coordinate_system.", &mut unknown);
    }
    if let Some(Value::Array(lods)) = value.get("lods") {
        for (i, lod) in lods.iter().enumerate() {
            push_unknown(lod, LOD_KEYS, &format!("lods[{i}]."), &mut unknown);
        }
    }
    if let Some(Value::Array(files)) = value.get("files") {
        for (i, file) in files.iter().enumerate() {
            push_unknown(file, FILE_KEYS, &format!("files[{i}]."), &mut unknown);
        }
    }

    unknown
}

fn as_str_map(value: Option<&Value>, field: &str) -> Result<BTreeMap<String, String>, ManifestError> {
    match value {
        None => Ok(BTreeMap::new()),
        Some(Value::Object(map)) => {
            let mut out = BTreeMap::new();
            for (k, v) in map {
                let s = v.as_str().ok_or_else(|| {
                    ManifestError::MalformedJson(format!("{field}.{k} must be a string"))
                })?;
                out.insert(k.clone(), s.to_string());
            }
            Ok(out)
        }
        Some(_) => Err(ManifestError::MalformedJson(format!("{field} must be an object"))),
    }
}

/// Decodes and fully re-validates a manifest from its canonical JSON bytes.
pub fn decode(bytes: &[u8]) -> Result<Manifest, ManifestError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ManifestError::MalformedJson(e.to_string()))?;

    if !value.is_object() {
        return Err(ManifestError::MalformedJson("top-level value must be an object".to_string()));
    }

    let schema_version = value
        .get("schema_version")
        .and_then(Value::as_u64)
        .ok_or_else(|| ManifestError::MalformedJson("missing schema_version".to_string()))?;
    if schema_version != SCHEMA_VERSION as u64 {
        return Err(ManifestError::UnsupportedSchemaVersion(schema_version.to_string()));
    }

    let unknown = collect_unknown_fields(&value);
    if !unknown.is_empty() {
        return Err(ManifestError::UnknownFields { keys: unknown });
    }

    let build_meta = as_str_map(value.get("build_meta"), "build_meta")?;
    let fallbacks = as_str_map(value.get("fallbacks"), "fallbacks")?;

    let cs_value = value
        .get("coordinate_system")
        .ok_or_else(|| ManifestError::MalformedJson("missing coordinate_system".to_string()))?;
    let up_axis_str = cs_value
        .get("up_axis")
        .and_then(Value::as_str)
        .ok_or_else(|| ManifestError::MalformedJson("missing coordinate_system.up_axis".to_string()))?;
    let up_axis = UpAxis::from_str(up_axis_str)
        .ok_or_else(|| ManifestError::InvalidUpAxis(up_axis_str.to_string()))?;
    let unit_scale = cs_value
        .get("unit_scale")
        .and_then(Value::as_f64)
        .ok_or_else(|| ManifestError::MalformedJson("missing coordinate_system.unit_scale".to_string()))?;
    let coordinate_system = CoordinateSystem { up_axis, unit_scale };

    let lods_value = value
        .get("lods")
        .and_then(Value::as_array)
        .ok_or_else(|| ManifestError::MalformedJson("missing lods array".to_string()))?;
    let mut lods = Vec::with_capacity(lods_value.len());
    for lod in lods_value {
        let lod_id = lod
            .get("lod_id")
            .and_then(Value::as_str)
            .ok_or_else(|| ManifestError::MalformedJson("lod missing lod_id".to_string()))?
            .to_string();
        let quality_tier_str = lod
            .get("quality_tier")
            .and_then(Value::as_str)
            .ok_or_else(|| ManifestError::MalformedJson("lod missing quality_tier".to_string()))?;
        let quality_tier = QualityTier::from_str(quality_tier_str).ok_or_else(|| {
            ManifestError::MalformedJson(format!("lod {lod_id} has unknown quality_tier {quality_tier_str}"))
        })?;
        let approx_splat_count = lod
            .get("approx_splat_count")
            .and_then(Value::as_u64)
            .ok_or_else(|| ManifestError::MalformedJson(format!("lod {lod_id} missing approx_splat_count")))?;
        let entry_file = lod
            .get("entry_file")
            .and_then(Value::as_str)
            .ok_or_else(|| ManifestError::MalformedJson(format!("lod {lod_id} missing entry_file")))?
            .to_string();
        lods.push(LodDescriptor {
            lod_id,
            quality_tier,
            approx_splat_count,
            entry_file,
        });
    }

    let files_value = value
        .get("files")
        .and_then(Value::as_array)
        .ok_or_else(|| ManifestError::MalformedJson("missing files array".to_string()))?;
    let mut files = Vec::with_capacity(files_value.len());
    for file in files_value {
        let path = file
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| ManifestError::MalformedJson("file missing path".to_string()))?
            .to_string();
        let sha256 = file
            .get("sha256")
            .and_then(Value::as_str)
            .ok_or_else(|| ManifestError::MalformedJson(format!("file {path} missing sha256")))?
            .to_string();
        let bytes = file
            .get("bytes")
            .and_then(Value::as_u64)
            .ok_or_else(|| ManifestError::MalformedJson(format!("file {path} missing bytes")))?;
        let content_type = file
            .get("content_type")
            .and_then(Value::as_str)
            .ok_or_else(|| ManifestError::MalformedJson(format!("file {path} missing content_type")))?
            .to_string();
        let role = file
            .get("role")
            .and_then(Value::as_str)
            .ok_or_else(|| ManifestError::MalformedJson(format!("file {path} missing role")))?
            .to_string();
        files.push(FileDescriptor {
            path,
            sha256,
            bytes,
            content_type,
            role,
        });
    }

    let policy_hash = value
        .get("policy_hash")
        .and_then(Value::as_str)
        .ok_or_else(|| ManifestError::MalformedJson("missing policy_hash".to_string()))?
        .to_string();
    let declared_artifact_id = value
        .get("artifact_id")
        .and_then(Value::as_str)
        .ok_or_else(|| ManifestError::MalformedJson("missing artifact_id".to_string()))?
        .to_string();
    let declared_artifact_hash = value
        .get("artifact_hash")
        .and_then(Value::as_str)
        .ok_or_else(|| ManifestError::MalformedJson("missing artifact_hash".to_string()))?
        .to_string();

    let draft = ManifestDraft {
        build_meta,
        coordinate_system,
        lods,
        files,
        fallbacks,
        policy_hash,
    };
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
    let (recomputed_id, recomputed_hash) = compute_hashes(&canonical_input);

    if recomputed_id != declared_artifact_id || recomputed_hash != declared_artifact_hash {
        return Err(ManifestError::ArtifactHashMismatch);
    }

    Ok(Manifest {
        schema_version: SCHEMA_VERSION,
        artifact_id: recomputed_id,
        build_meta: draft.build_meta,
        coordinate_system: draft.coordinate_system,
        lods: sorted_lods,
        files: sorted_files,
        fallbacks: draft.fallbacks,
        policy_hash: draft.policy_hash,
        artifact_hash: recomputed_hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{build, ManifestDraft};
    use crate::model::{CoordinateSystem, FileDescriptor, LodDescriptor, QualityTier, UpAxis};

    fn sample_manifest() -> Manifest {
        build(ManifestDraft {
            build_meta: BTreeMap::new(),
            coordinate_system: CoordinateSystem {
                up_axis: UpAxis::Y,
                unit_scale: 1.0,
            },
            lods: vec![LodDescriptor {
                lod_id: "lod0".to_string(),
                quality_tier: QualityTier::High,
                approx_splat_count: 100,
                entry_file: "lod0/mesh.ply".to_string(),
            }],
            files: vec![FileDescriptor {
                path: "lod0/mesh.ply".to_string(),
                sha256: "a".repeat(64),
                bytes: 10,
                content_type: "application/x-aether-ply".to_string(),
                role: "lod_entry".to_string(),
            }],
            fallbacks: BTreeMap::new(),
            policy_hash: "b".repeat(64),
        })
        .unwrap()
    }

    #[test]
    fn test_decode_round_trips_a_built_manifest() {
        let manifest = sample_manifest();
        let bytes = serde_json::to_vec(&manifest).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, manifest);
    }

    #[test]
    fn test_decode_rejects_unknown_top_level_field() {
        let manifest = sample_manifest();
        let mut value = serde_json::to_value(&manifest).unwrap();
        value
            .as_object_mut()
            .unwrap()
            .insert("extra_field".to_string(), Value::Bool(true));
        let bytes = serde_json::to_vec(&value).unwrap();
        let err = decode(&bytes).unwrap_err();
        match err {
            ManifestError::UnknownFields { keys } => assert_eq!(keys, vec!["extra_field".to_string()]),
            other => panic!("expected UnknownFields, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_tampered_artifact_hash() {
        let manifest = sample_manifest();
        let mut value = serde_json::to_value(&manifest).unwrap();
        value["artifact_hash"] = Value::String("f".repeat(64));
        let bytes = serde_json::to_vec(&value).unwrap();
        assert_eq!(decode(&bytes).unwrap_err(), ManifestError::ArtifactHashMismatch);
    }

    #[test]
    fn test_decode_rejects_unsupported_schema_version() {
        let manifest = sample_manifest();
        let mut value = serde_json::to_value(&manifest).unwrap();
        value["schema_version"] = Value::from(2);
        let bytes = serde_json::to_vec(&value).unwrap();
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            ManifestError::UnsupportedSchemaVersion(_)
        ));
    }
}
