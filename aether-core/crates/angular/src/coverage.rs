//! Per-patch coverage tracker (§4.6): two bucket bitsets, per-bucket
//! transition counters, and a capped observation ring.

use std::collections::HashSet;

use crate::bucket::{phi_bucket, theta_bucket};

const OBSERVATION_CAP: usize = 200;
const L2_PLUS_THRESHOLD: f64 = 0.3;
const L3_THRESHOLD: f64 = 0.6;
const BUCKET_DEGREES: f64 = 15.0;
const THETA_BUCKETS: u32 = 24;
const PHI_MASK: u16 = 0x0FFF;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub frame_index: u64,
    pub theta_bucket: u8,
    pub phi_bucket: u8,
    pub pr3_quality: f64,
    seq: u64,
}

/// Coverage state for a single patch. Bitsets only ever grow (an observed
/// bucket is observed forever); the observation ring is a bounded record
/// of recent raw observations for inspection, evicted by oldest
/// `frame_index` (ties broken by insertion order) once it exceeds 200
/// entries.
#[derive(Debug, Default)]
pub struct PatchCoverage {
    theta_bits: u32,
    phi_bits: u16,
    l2_plus_buckets: HashSet<(u8, u8)>,
    l3_buckets: HashSet<(u8, u8)>,
    l2_plus_count: u32,
    l3_count: u32,
    observations: Vec<Observation>,
    next_seq: u64,
}

impl PatchCoverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one frame's evidence for this patch: `dir` is a unit
    /// direction `(dx, dy, dz)`.
    pub fn record(&mut self, dir: (f64, f64, f64), pr3_quality: f64, frame_index: u64) {
        let (dx, dy, dz) = dir;
        let theta = theta_bucket(dx, dz);
        let phi = phi_bucket(dy);

        self.theta_bits |= 1u32 << theta;
        self.phi_bits |= 1u16 << phi;

        if pr3_quality >= L2_PLUS_THRESHOLD && self.l2_plus_buckets.insert((theta, phi)) {
            self.l2_plus_count += 1;
        }
        if pr3_quality >= L3_THRESHOLD && self.l3_buckets.insert((theta, phi)) {
            self.l3_count += 1;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.observations.push(Observation {
            frame_index,
            theta_bucket: theta,
            phi_bucket: phi,
            pr3_quality,
            seq,
        });

        if self.observations.len() > OBSERVATION_CAP {
            let evict_at = self
                .observations
                .iter()
                .enumerate()
                .min_by_key(|(_, o)| (o.frame_index, o.seq))
                .map(|(i, _)| i)
                .expect("non-empty after push");
            self.observations.remove(evict_at);
        }
    }

    /// `(θ_span_deg, φ_span_deg, l2_plus_count, l3_count)` for Gate Gain.
    pub fn view_gain_inputs(&self) -> (f64, f64, u32, u32) {
        (
            circular_span_theta(self.theta_bits),
            linear_span_phi(self.phi_bits),
            self.l2_plus_count,
            self.l3_count,
        )
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }
}

/// Largest circular gap of unobserved θ buckets, converted to a degree
/// span: `(24 − gap) · 15°`. Empty or single-bucket bitsets return 0.
fn circular_span_theta(bits: u32) -> f64 {
    let bits = bits & ((1u32 << THETA_BUCKETS) - 1);
    let count = bits.count_ones();
    if count <= 1 {
        return 0.0;
    }

    let mut max_gap = 0u32;
    let mut cur_gap = 0u32;
    for i in 0..(2 * THETA_BUCKETS) {
        let bit = (bits >> (i % THETA_BUCKETS)) & 1;
        if bit == 0 {
            cur_gap += 1;
            max_gap = max_gap.max(cur_gap);
        } else {
            cur_gap = 0;
        }
    }

    let span_buckets = THETA_BUCKETS - max_gap;
    span_buckets as f64 * BUCKET_DEGREES
}

/// Linear φ span: `(last_index − first_index) · 15°`.
fn linear_span_phi(bits: u16) -> f64 {
    let bits = bits & PHI_MASK;
    if bits == 0 {
        return 0.0;
    }
    let first = bits.trailing_zeros() as i32;
    let last = 15 - bits.leading_zeros() as i32;
    ((last - first) as f64) * BUCKET_DEGREES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tracker_has_zero_spans() {
        let tracker = PatchCoverage::new();
        let (theta, phi, l2, l3) = tracker.view_gain_inputs();
        assert_eq!(theta, 0.0);
        assert_eq!(phi, 0.0);
        assert_eq!(l2, 0);
        assert_eq!(l3, 0);
    }

    #[test]
    fn test_single_observation_has_zero_span() {
        let mut tracker = PatchCoverage::new();
        tracker.record((1.0, 0.0, 0.0), 0.5, 0);
        let (theta, phi, _, _) = tracker.view_gain_inputs();
        assert_eq!(theta, 0.0);
        assert_eq!(phi, 0.0);
    }

    #[test]
    fn test_l2_plus_and_l3_counters_increment_once_per_bucket() {
        let mut tracker = PatchCoverage::new();
        tracker.record((1.0, 0.0, 0.0), 0.9, 0);
        tracker.record((1.0, 0.0, 0.0), 0.9, 1);
        let (_, _, l2, l3) = tracker.view_gain_inputs();
        assert_eq!(l2, 1);
        assert_eq!(l3, 1);
    }

    #[test]
    fn test_l2_plus_does_not_count_low_quality_observations() {
        let mut tracker = PatchCoverage::new();
        tracker.record((1.0, 0.0, 0.0), 0.1, 0);
        let (_, _, l2, l3) = tracker.view_gain_inputs();
        assert_eq!(l2, 0);
        assert_eq!(l3, 0);
    }

    #[test]
    fn test_span_is_order_independent() {
        let mut a = PatchCoverage::new();
        a.record((1.0, 0.0, 0.0), 0.5, 0);
        a.record((0.0, 0.0, 1.0), 0.5, 1);
        a.record((-1.0, 0.0, 0.0), 0.5, 2);

        let mut b = PatchCoverage::new();
        b.record((-1.0, 0.0, 0.0), 0.5, 0);
        b.record((1.0, 0.0, 0.0), 0.5, 1);
        b.record((0.0, 0.0, 1.0), 0.5, 2);

        assert_eq!(a.view_gain_inputs(), b.view_gain_inputs());
    }

    #[test]
    fn test_observation_ring_evicts_oldest_frame_index_first() {
        let mut tracker = PatchCoverage::new();
        for frame in 0..(OBSERVATION_CAP as u64 + 1) {
            tracker.record((1.0, 0.0, 0.0), 0.5, frame);
        }
        assert_eq!(tracker.observations().len(), OBSERVATION_CAP);
        let min_frame = tracker.observations().iter().map(|o| o.frame_index).min().unwrap();
        assert_eq!(min_frame, 1);
    }

    proptest::proptest! {
        #[test]
        fn test_span_invariant_under_permutation(
            perm_seed in 0u64..1000,
            frames in proptest::collection::vec((-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0, 0.0f64..1.0), 1..20),
        ) {
            let mut forward = PatchCoverage::new();
            for (i, (dx, dy, dz, q)) in frames.iter().enumerate() {
                forward.record((*dx, *dy, *dz), *q, i as u64);
            }

            let mut shuffled: Vec<_> = frames.iter().enumerate().collect();
            // Deterministic pseudo-shuffle keyed by perm_seed, no RNG crate needed.
            shuffled.sort_by_key(|(i, _)| (*i as u64).wrapping_mul(2654435761).wrapping_add(perm_seed));
            let mut backward = PatchCoverage::new();
            for (i, (dx, dy, dz, q)) in shuffled {
                backward.record((*dx, *dy, *dz), *q, i as u64);
            }

            prop_assert_eq!(forward.view_gain_inputs(), backward.view_gain_inputs());
        }
    }

    #[test]
    fn test_full_theta_coverage_gives_full_span() {
        let mut tracker = PatchCoverage::new();
        for bucket in 0..24u32 {
            // Synthesize a direction landing in each bucket via the same
            // octant math `theta_bucket` uses: walk the full circle.
            let angle = (bucket as f64 + 0.5) * 15.0;
            let rad = angle.to_radians();
            tracker.record((rad.cos(), 0.0, rad.sin()), 0.5, bucket as u64);
        }
        let (theta_span, _, _, _) = tracker.view_gain_inputs();
        assert_eq!(theta_span, 360.0);
    }
}
