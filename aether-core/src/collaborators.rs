//! The external-collaborator surface named in §6: well-typed boundaries
//! the core compiles against but never implements. No camera pipeline,
//! no HTTP client, no AR session logic lives here.

use async_trait::async_trait;
use thiserror::Error;

/// Per-frame evidence the AR runtime hands to the Coverage Tracker and
/// Gate Gain. A plain value object — the core does no capture, no mesh
/// processing, and no photometric analysis; it only consumes these
/// fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameEvidence {
    pub patch_id: u64,
    pub direction: (f64, f64, f64),
    pub frame_index: u64,
    pub pr3_quality: f64,
    pub reproj_rms_px: f64,
    pub edge_rms_px: f64,
    pub sharpness: f64,
    pub overexposure_ratio: f64,
    pub underexposure_ratio: f64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteBuildError {
    #[error("remote build API is not configured")]
    ApiNotConfigured,
    #[error("network timeout")]
    NetworkTimeout,
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("remote build API returned an error: {0}")]
    ApiError(String),
    #[error("input rejected by remote build service: {0}")]
    InputInvalid(String),
    #[error("unknown remote build failure: {0}")]
    UnknownError(String),
}

/// Asynchronous splat-build pipeline, hosted entirely outside this crate.
/// `upload`/`start`/`poll`/`download` are four independent suspend points
/// so a caller can retry or cancel any one of them without restarting
/// the whole job; no transport (HTTP, gRPC, …) is wired in here.
#[async_trait]
pub trait RemoteBuildService: Send + Sync {
    async fn upload(&self, artifact_bytes: &[u8]) -> Result<String, RemoteBuildError>;
    async fn start(&self, upload_id: &str) -> Result<String, RemoteBuildError>;
    async fn poll(&self, job_id: &str) -> Result<bool, RemoteBuildError>;
    async fn download(&self, job_id: &str) -> Result<(Vec<u8>, String), RemoteBuildError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_evidence_is_a_plain_copyable_value() {
        let a = FrameEvidence {
            patch_id: 1,
            direction: (0.0, 1.0, 0.0),
            frame_index: 0,
            pr3_quality: 0.5,
            reproj_rms_px: 0.1,
            edge_rms_px: 0.1,
            sharpness: 0.8,
            overexposure_ratio: 0.0,
            underexposure_ratio: 0.0,
        };
        let b = a;
        assert_eq!(a, b);
    }
}
