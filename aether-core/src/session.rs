//! Wires the Coverage Tracker, Gate Gain, and Display Map into the
//! per-patch data flow from §2: raw evidence → bucketing → coverage →
//! gate gain → quantized quality → display. This is the one place in
//! the core that owns the full per-patch pipeline end to end; everything
//! it calls is pure value computation apart from `DisplayMap`'s owned
//! state.

use std::collections::HashMap;

use aether_canon::{Q01, TierContext};
use aether_angular::{DisplayMap, PatchCoverage};
use aether_gate::{gate_quality, GateConfig, GateInputs};

use crate::collaborators::FrameEvidence;

/// The quality record handed to external consumers (§6): all three
/// fields are Q01 integers, never raw floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityRecord {
    pub display_q01: Q01,
    pub color_evidence_q01: Q01,
    pub gate_quality_q01: Q01,
}

/// Owns one [`PatchCoverage`] per observed patch plus the shared
/// [`DisplayMap`], and runs a frame of evidence through the full
/// pipeline in one call.
pub struct PatchSession {
    coverage: HashMap<u64, PatchCoverage>,
    display: DisplayMap,
    gate_config: GateConfig,
    tier: TierContext,
}

impl PatchSession {
    pub fn new(gate_config: GateConfig, alpha_locked: f64, alpha_unlocked: f64) -> Self {
        PatchSession {
            coverage: HashMap::new(),
            display: DisplayMap::new(alpha_locked, alpha_unlocked),
            gate_config,
            tier: TierContext::Canonical,
        }
    }

    /// Records `evidence` for its patch, recomputes that patch's gate
    /// quality, and folds the result into the monotone display map.
    /// `global_display` is the session-wide display value supplied by
    /// the caller (an external aggregate, not computed here); `is_locked`
    /// and `ts_ms` feed the display map's EMA rate selection and
    /// timestamp bookkeeping respectively.
    pub fn record_frame(
        &mut self,
        evidence: FrameEvidence,
        global_display: f64,
        is_locked: bool,
        ts_ms: u64,
    ) -> QualityRecord {
        let coverage = self.coverage.entry(evidence.patch_id).or_default();
        coverage.record(evidence.direction, evidence.pr3_quality, evidence.frame_index);

        let (theta_span_deg, phi_span_deg, l2_plus_count, l3_count) = coverage.view_gain_inputs();
        let inputs = GateInputs {
            theta_span_deg,
            phi_span_deg,
            l2_plus_count: l2_plus_count as i64,
            l3_count: l3_count as i64,
            reproj_rms_px: evidence.reproj_rms_px,
            edge_rms_px: evidence.edge_rms_px,
            sharpness: evidence.sharpness,
            overexposure_ratio: evidence.overexposure_ratio,
            underexposure_ratio: evidence.underexposure_ratio,
        };

        let quality = gate_quality(&inputs, &self.gate_config, self.tier);

        let patch_key = evidence.patch_id.to_string();
        let entry = self.display.update(&patch_key, quality.to_f64(), is_locked, ts_ms);
        let color_evidence = self
            .display
            .color_evidence(&patch_key, global_display)
            .expect("just updated this patch");

        QualityRecord {
            display_q01: Q01::from_unit(entry.display),
            color_evidence_q01: Q01::from_unit(color_evidence),
            gate_quality_q01: quality,
        }
    }

    pub fn display_map(&self) -> &DisplayMap {
        &self.display
    }
}
