//! Aether capture core: artifact packaging and its canonical manifest,
//! the deterministic quality gate (coverage tracking, gain, display),
//! the crash-consistent WAL, and the PIZ region detector — wired
//! together behind one facade, analogous to how the node workspace's
//! `bpi-core` re-exports its component crates for downstream callers.

pub mod collaborators;
pub mod session;

pub use collaborators::{FrameEvidence, RemoteBuildError, RemoteBuildService};
pub use session::{PatchSession, QualityRecord};

pub use aether_angular::{phi_bucket, theta_bucket, DisplayEntry, DisplayMap, Observation, PatchCoverage};
pub use aether_canon::{round_half_away_from_zero, sigma_lut, sigma_stable, CanonError, Q01, TierContext};
pub use aether_gate::{
    basic_gain, fallback_quality, gate_quality, geom_gain, view_gain, GateConfig, GateError, GateInputValidator,
    GateInputs, GateWeights,
};
pub use aether_manifest::{
    build, build_whitebox, decode, CoordinateSystem, FileDescriptor, LodDescriptor, Manifest, ManifestDraft,
    ManifestError, QualityTier, UpAxis, WhiteboxFile, WhiteboxManifest,
};
pub use aether_package::{validate_package, PackageError};
pub use aether_piz::{
    canonicalize, detect, gate_recommendation, recapture_suggestion, CoverageGrid, GateRecommendation, PizError,
    PizThresholds, RecapturePriority, RecaptureSuggestion, Region, Report, ReportProfile,
};
pub use aether_wal::{Entry, FileWalStorage, MerkleTree, RecoveryManager, SignedAuditLog, SqliteWalStorage, Wal, WalError, WalStorage};
pub use crypto_primitives::{sha256, to_hex, CryptoError, Ed25519KeyPair, Ed25519PublicKey};
