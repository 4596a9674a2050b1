//! Schema-versioned artifact manifest: byte-exact hashing, strict
//! closed-world decode, and the invariants in between.
//!
//! A [`Manifest`] can only be produced by [`build::build`] (fresh
//! construction from a [`build::ManifestDraft`]) or [`decode::decode`]
//! (parsing previously-serialized bytes) — both run the same field
//! validation in [`build::validate_draft`] and the same hashing in
//! [`canonical`], so a `Manifest` value in hand is always internally
//! consistent: every path is hygienic, every hash matches the bytes it
//! describes, and every cross-reference (LOD entry files, fallback roles)
//! resolves.

pub mod build;
pub mod canonical;
pub mod decode;
pub mod errors;
pub mod model;
pub mod validate;
pub mod whitebox;

pub use build::{build, ManifestDraft, SCHEMA_VERSION};
pub use decode::decode;
pub use errors::ManifestError;
pub use model::{
    CoordinateSystem, FileDescriptor, LodDescriptor, Manifest, QualityTier, UpAxis,
    CONTENT_TYPE_WHITELIST, FALLBACK_KEYS, ROLE_WHITELIST,
};
pub use whitebox::{build_whitebox, WhiteboxFile, WhiteboxManifest};
