//! Typed shape of the artifact manifest (schema_version = 1).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpAxis {
    #[serde(rename = "X")]
    X,
    #[serde(rename = "-X")]
    NegX,
    #[serde(rename = "Y")]
    Y,
    #[serde(rename = "-Y")]
    NegY,
    #[serde(rename = "Z")]
    Z,
    #[serde(rename = "-Z")]
    NegZ,
}

impl UpAxis {
    pub fn as_str(self) -> &'static str {
        match self {
            UpAxis::X => "X",
            UpAxis::NegX => "-X",
            UpAxis::Y => "Y",
            UpAxis::NegY => "-Y",
            UpAxis::Z => "Z",
            UpAxis::NegZ => "-Z",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "X" => Some(UpAxis::X),
            "-X" => Some(UpAxis::NegX),
            "Y" => Some(UpAxis::Y),
            "-Y" => Some(UpAxis::NegY),
            "Z" => Some(UpAxis::Z),
            "-Z" => Some(UpAxis::NegZ),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Low,
    Medium,
    High,
}

impl QualityTier {
    pub fn as_str(self) -> &'static str {
        match self {
            QualityTier::Low => "low",
            QualityTier::Medium => "medium",
            QualityTier::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(QualityTier::Low),
            "medium" => Some(QualityTier::Medium),
            "high" => Some(QualityTier::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSystem {
    pub up_axis: UpAxis,
    pub unit_scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LodDescriptor {
    pub lod_id: String,
    pub quality_tier: QualityTier,
    pub approx_splat_count: u64,
    pub entry_file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub path: String,
    pub sha256: String,
    pub bytes: u64,
    pub content_type: String,
    pub role: String,
}

/// The immutable, fully validated artifact manifest. The only way to get
/// one is [`crate::build::build`] (fresh construction) or
/// [`crate::decode::decode`] (strict closed-world decode) — both paths run
/// the same field validation and hash computation, so a `Manifest` value
/// is always internally consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub schema_version: u32,
    pub artifact_id: String,
    pub build_meta: BTreeMap<String, String>,
    pub coordinate_system: CoordinateSystem,
    pub lods: Vec<LodDescriptor>,
    pub files: Vec<FileDescriptor>,
    pub fallbacks: BTreeMap<String, String>,
    pub policy_hash: String,
    pub artifact_hash: String,
}

/// Closed whitelist for `content_type`. Additions require a schema bump.
pub const CONTENT_TYPE_WHITELIST: &[&str] = &[
    "application/x-aether-ply",
    "application/x-aether-splat",
    "model/gltf-binary",
    "image/jpeg",
    "image/png",
    "video/mp4",
    "application/json",
];

/// Closed whitelist for `role`.
pub const ROLE_WHITELIST: &[&str] = &[
    "lod_entry",
    "thumbnail",
    "preview_video",
    "metadata",
    "texture",
];

/// Closed whitelist for fallback keys — every fallback key must also match
/// the `role` of the file it points at (§4.2).
pub const FALLBACK_KEYS: &[&str] = &["thumbnail", "preview_video"];
