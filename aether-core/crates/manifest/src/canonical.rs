//! Canonical byte assembly and hashing for the artifact manifest.
//!
//! `artifact_id` and `artifact_hash` are both `SHA256(PREFIX ++ canonical
//! bytes)` over two different field sets: `artifact_id` hashes the manifest
//! *without* `artifact_id` or `artifact_hash` present, and is then folded
//! back in so `artifact_hash` hashes the manifest *with* `artifact_id`
//! present but still without `artifact_hash`. Sharing the prefix between the
//! two hashes is what the data model calls out explicitly in §3 — it is
//! what stops an `artifact_id` computed for one manifest from ever being
//! mistaken for an `artifact_hash` of another.

use aether_canon::{CanonValue, CanonWriter};
use crypto_primitives::{sha256, to_hex};
use std::collections::BTreeMap;

use crate::model::{CoordinateSystem, FileDescriptor, LodDescriptor};

const DOMAIN_PREFIX: &[u8] = b"aether.artifact.manifest.v1\0";
const UNIT_SCALE_FRAC_DIGITS: u32 = 9;

pub struct CanonicalInput<'a> {
    pub schema_version: u32,
    pub build_meta: &'a BTreeMap<String, String>,
    pub coordinate_system: &'a CoordinateSystem,
    /// Must already be sorted ascending by `lod_id`.
    pub lods: &'a [LodDescriptor],
    /// Must already be sorted ascending by `path`.
    pub files: &'a [FileDescriptor],
    pub fallbacks: &'a BTreeMap<String, String>,
    pub policy_hash: &'a str,
}

fn build_meta_value(map: &BTreeMap<String, String>) -> CanonValue {
    CanonValue::object(
        map.iter()
            .map(|(k, v)| (k.clone(), CanonValue::str(v.clone())))
            .collect(),
    )
}

fn coordinate_system_value(cs: &CoordinateSystem) -> CanonValue {
    let scaled = aether_canon::round_half_away_from_zero(cs.unit_scale * 10f64.powi(UNIT_SCALE_FRAC_DIGITS as i32));
    CanonValue::object(vec![
        ("up_axis".to_string(), CanonValue::str(cs.up_axis.as_str())),
        (
            "unit_scale".to_string(),
            CanonValue::FixedPoint(scaled, UNIT_SCALE_FRAC_DIGITS),
        ),
    ])
}

fn lod_value(lod: &LodDescriptor) -> CanonValue {
    CanonValue::object(vec![
        ("approx_splat_count".to_string(), CanonValue::Int(lod.approx_splat_count as i64)),
        ("entry_file".to_string(), CanonValue::str(lod.entry_file.clone())),
        ("lod_id".to_string(), CanonValue::str(lod.lod_id.clone())),
        ("quality_tier".to_string(), CanonValue::str(lod.quality_tier.as_str())),
    ])
}

fn file_value(file: &FileDescriptor) -> CanonValue {
    CanonValue::object(vec![
        ("bytes".to_string(), CanonValue::Int(file.bytes as i64)),
        ("content_type".to_string(), CanonValue::str(file.content_type.clone())),
        ("path".to_string(), CanonValue::str(file.path.clone())),
        ("role".to_string(), CanonValue::str(file.role.clone())),
        ("sha256".to_string(), CanonValue::str(file.sha256.clone())),
    ])
}

fn to_canon_value(input: &CanonicalInput, artifact_id: Option<&str>) -> CanonValue {
    let mut fields = Vec::with_capacity(8);
    fields.push(("schema_version".to_string(), CanonValue::Int(input.schema_version as i64)));
    if let Some(id) = artifact_id {
        fields.push(("artifact_id".to_string(), CanonValue::str(id)));
    }
    fields.push(("build_meta".to_string(), build_meta_value(input.build_meta)));
    fields.push((
        "coordinate_system".to_string(),
        coordinate_system_value(input.coordinate_system),
    ));
    fields.push((
        "lods".to_string(),
        CanonValue::Array(input.lods.iter().map(lod_value).collect()),
    ));
    fields.push((
        "files".to_string(),
        CanonValue::Array(input.files.iter().map(file_value).collect()),
    ));
    if !input.fallbacks.is_empty() {
        fields.push(("fallbacks".to_string(), build_meta_value(input.fallbacks)));
    }
    fields.push(("policy_hash".to_string(), CanonValue::str(input.policy_hash)));
    CanonValue::object(fields)
}

/// Computes `(artifact_id, artifact_hash)` for a fully validated, sorted
/// set of manifest fields.
pub fn compute_hashes(input: &CanonicalInput) -> (String, String) {
    let tmp = to_canon_value(input, None);
    let tmp_bytes = CanonWriter::encode(&tmp);
    let mut prefixed = Vec::with_capacity(DOMAIN_PREFIX.len() + tmp_bytes.len());
    prefixed.extend_from_slice(DOMAIN_PREFIX);
    prefixed.extend_from_slice(&tmp_bytes);
    let artifact_id = to_hex(&sha256(&prefixed))[..32].to_string();

    let canonical = to_canon_value(input, Some(&artifact_id));
    let canonical_bytes = CanonWriter::encode(&canonical);
    let mut prefixed2 = Vec::with_capacity(DOMAIN_PREFIX.len() + canonical_bytes.len());
    prefixed2.extend_from_slice(DOMAIN_PREFIX);
    prefixed2.extend_from_slice(&canonical_bytes);
    let artifact_hash = to_hex(&sha256(&prefixed2));

    (artifact_id, artifact_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QualityTier, UpAxis};

    fn sample_input<'a>(
        build_meta: &'a BTreeMap<String, String>,
        cs: &'a CoordinateSystem,
        lods: &'a [LodDescriptor],
        files: &'a [FileDescriptor],
        fallbacks: &'a BTreeMap<String, String>,
        policy_hash: &'a str,
    ) -> CanonicalInput<'a> {
        CanonicalInput {
            schema_version: 1,
            build_meta,
            coordinate_system: cs,
            lods,
            files,
            fallbacks,
            policy_hash,
        }
    }

    #[test]
    fn test_compute_hashes_is_deterministic() {
        let build_meta = BTreeMap::new();
        let cs = CoordinateSystem {
            up_axis: UpAxis::Y,
            unit_scale: 1.0,
        };
        let lods = vec![LodDescriptor {
            lod_id: "lod0".to_string(),
            quality_tier: QualityTier::High,
            approx_splat_count: 1000,
            entry_file: "lod0/mesh.ply".to_string(),
        }];
        let files = vec![FileDescriptor {
            path: "lod0/mesh.ply".to_string(),
            sha256: "b".repeat(64),
            bytes: 100,
            content_type: "application/x-aether-ply".to_string(),
            role: "lod_entry".to_string(),
        }];
        let fallbacks = BTreeMap::new();
        let policy_hash = "a".repeat(64);
        let input = sample_input(&build_meta, &cs, &lods, &files, &fallbacks, &policy_hash);
        let (id1, hash1) = compute_hashes(&input);
        let (id2, hash2) = compute_hashes(&input);
        assert_eq!(id1, id2);
        assert_eq!(hash1, hash2);
        assert_eq!(id1.len(), 32);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_artifact_id_changes_if_files_change() {
        let build_meta = BTreeMap::new();
        let cs = CoordinateSystem {
            up_axis: UpAxis::Y,
            unit_scale: 1.0,
        };
        let lods: Vec<LodDescriptor> = vec![];
        let fallbacks = BTreeMap::new();
        let files_a = vec![FileDescriptor {
            path: "a.ply".to_string(),
            sha256: "b".repeat(64),
            bytes: 1,
            content_type: "application/x-aether-ply".to_string(),
            role: "lod_entry".to_string(),
        }];
        let files_b = vec![FileDescriptor {
            path: "a.ply".to_string(),
            sha256: "c".repeat(64),
            bytes: 1,
            content_type: "application/x-aether-ply".to_string(),
            role: "lod_entry".to_string(),
        }];
        let policy_hash = "a".repeat(64);
        let input_a = sample_input(&build_meta, &cs, &lods, &files_a, &fallbacks, &policy_hash);
        let input_b = sample_input(&build_meta, &cs, &lods, &files_b, &fallbacks, &policy_hash);
        let (id_a, _) = compute_hashes(&input_a);
        let (id_b, _) = compute_hashes(&input_b);
        assert_ne!(id_a, id_b);
    }

    #[test]
    fn test_empty_fallbacks_are_omitted_not_emitted_as_empty_object() {
        let build_meta = BTreeMap::new();
        let cs = CoordinateSystem {
            up_axis: UpAxis::Y,
            unit_scale: 1.0,
        };
        let lods: Vec<LodDescriptor> = vec![];
        let files: Vec<FileDescriptor> = vec![];
        let fallbacks = BTreeMap::new();
        let policy_hash = "a".repeat(64);
        let input = sample_input(&build_meta, &cs, &lods, &files, &fallbacks, &policy_hash);
        let bytes = CanonWriter::encode(&to_canon_value(&input, None));
        let json = String::from_utf8(bytes).unwrap();
        assert!(!json.contains("fallbacks"));
    }
}
