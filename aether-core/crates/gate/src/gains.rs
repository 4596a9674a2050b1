//! The three gains, their weighted combination into `gate_quality`, and
//! the computed worst-case fallback used when validation fails (§4.7).

use aether_canon::{sigma_lut, sigma_stable, Q01, TierContext};

use crate::inputs::{GateInputValidator, GateInputs};

fn sigma(x: f64, tier: TierContext) -> f64 {
    match tier {
        TierContext::Canonical => sigma_stable(x),
        TierContext::Benchmark => sigma_lut(x, tier),
    }
}

/// Three weights that must sum to exactly 1.0, checked once at
/// construction so a misconfigured gate fails loudly at startup rather
/// than silently skewing every quality score it ever produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateWeights {
    pub w_v: f64,
    pub w_g: f64,
    pub w_b: f64,
}

impl GateWeights {
    pub fn new(w_v: f64, w_g: f64, w_b: f64) -> Self {
        let sum = w_v + w_g + w_b;
        assert!(
            (sum - 1.0).abs() < 1e-9,
            "gate weights must sum to exactly 1.0, got {sum}"
        );
        GateWeights { w_v, w_g, w_b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateConfig {
    pub weights: GateWeights,
    pub min_view_gain: f64,
    pub min_basic_gain: f64,
    /// Sharpness offset (`γ₁`) inside `basic_gain`.
    pub gamma1: f64,
}

pub fn view_gain(inputs: &GateInputs, config: &GateConfig, tier: TierContext) -> f64 {
    let parts = [
        sigma(inputs.theta_span_deg - 26.0, tier),
        sigma(inputs.phi_span_deg - 15.0, tier),
        sigma(inputs.l2_plus_count as f64 - 13.0, tier),
        sigma(inputs.l3_count as f64 - 5.0, tier),
    ];
    let mean = parts.iter().sum::<f64>() / parts.len() as f64;
    mean.max(config.min_view_gain).clamp(0.0, 1.0)
}

pub fn geom_gain(inputs: &GateInputs, tier: TierContext) -> f64 {
    let a = sigma(-(inputs.reproj_rms_px - 0.48), tier);
    let b = sigma(-(inputs.edge_rms_px - 0.23), tier);
    (a * b).clamp(0.0, 1.0)
}

pub fn basic_gain(inputs: &GateInputs, config: &GateConfig, tier: TierContext) -> f64 {
    let a = sigma(inputs.sharpness - config.gamma1, tier);
    let b = sigma(-(inputs.overexposure_ratio - 0.30), tier);
    let c = sigma(-(inputs.underexposure_ratio - 0.35), tier);
    (a * b * c).max(config.min_basic_gain).clamp(0.0, 1.0)
}

/// The worst-case quality used when [`GateInputValidator`] rejects the
/// input: the view gain pinned at its floor, geometry assumed at its
/// absolute worst (0), and basic gain pinned at its floor — then capped
/// at `min_view_gain` so the fallback can never read as healthier than
/// the gate's own view-gain floor.
pub fn fallback_quality(config: &GateConfig) -> Q01 {
    let weighted = config.weights.w_v * config.min_view_gain
        + config.weights.w_g * 0.0
        + config.weights.w_b * config.min_basic_gain;
    Q01::from_unit(weighted.min(config.min_view_gain))
}

/// Computes the quantized gate quality. Never panics: invalid inputs are
/// caught by [`GateInputValidator`] and routed to [`fallback_quality`]
/// instead of propagating.
pub fn gate_quality(inputs: &GateInputs, config: &GateConfig, tier: TierContext) -> Q01 {
    match GateInputValidator::validate(inputs) {
        Ok(()) => {
            let view = view_gain(inputs, config, tier);
            let geom = geom_gain(inputs, tier);
            let basic = basic_gain(inputs, config, tier);
            let total = config.weights.w_v * view + config.weights.w_g * geom + config.weights.w_b * basic;
            Q01::from_unit(total.clamp(0.0, 1.0))
        }
        Err(reason) => {
            tracing::warn!(%reason, "gate input validation failed, using fallback quality");
            fallback_quality(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_config() -> GateConfig {
        GateConfig {
            weights: GateWeights::new(0.5, 0.3, 0.2),
            min_view_gain: 0.1,
            min_basic_gain: 0.1,
            gamma1: 0.5,
        }
    }

    fn strong_inputs() -> GateInputs {
        GateInputs {
            theta_span_deg: 300.0,
            phi_span_deg: 150.0,
            l2_plus_count: 40,
            l3_count: 20,
            reproj_rms_px: 0.1,
            edge_rms_px: 0.05,
            sharpness: 2.0,
            overexposure_ratio: 0.0,
            underexposure_ratio: 0.0,
        }
    }

    #[test]
    #[should_panic]
    fn test_gate_weights_reject_non_unit_sum() {
        GateWeights::new(0.5, 0.5, 0.5);
    }

    #[test]
    fn test_gate_quality_is_high_for_strong_evidence() {
        let config = default_config();
        let q = gate_quality(&strong_inputs(), &config, TierContext::Canonical);
        assert!(q.to_f64() > 0.8);
    }

    #[test]
    fn test_gate_quality_falls_back_on_invalid_input() {
        let config = default_config();
        let mut inputs = strong_inputs();
        inputs.sharpness = f64::NAN;
        let q = gate_quality(&inputs, &config, TierContext::Canonical);
        assert_eq!(q, fallback_quality(&config));
    }

    #[test]
    fn test_fallback_quality_is_bounded_by_min_view_gain() {
        let config = default_config();
        let fallback = fallback_quality(&config);
        assert!(fallback.to_f64() <= config.min_view_gain + 1e-9);
    }

    #[test]
    fn test_gate_quality_never_exceeds_one_or_goes_below_zero() {
        let config = default_config();
        let mut inputs = strong_inputs();
        inputs.theta_span_deg = 1.0e9;
        let q = gate_quality(&inputs, &config, TierContext::Canonical);
        assert!((0.0..=1.0).contains(&q.to_f64()));
    }
}
