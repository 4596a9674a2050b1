//! Zero-trigonometry φ/θ bucketing of a unit direction (§4.5).
//!
//! θ-bucketing never calls a trigonometric function at runtime. Within each
//! 45° octant (picked from the signs and relative magnitude of `dx`/`dz`)
//! the ratio `t = min(|dx|,|dz|) / max(|dx|,|dz|)` is exactly `tan` of the
//! angle measured from the octant's start, so comparing `t` against the
//! precomputed constants `tan(15°)` and `tan(30°)` recovers the same
//! 15°-wide bucket a trig-based `atan2` would, without ever calling `atan2`.

const EPS: f64 = 1e-12;
const TAN_15: f64 = 0.267_949_192_431_122_7;
const TAN_30: f64 = 0.577_350_269_189_625_8;

/// Maps `dy ∈ [-1,1]` (clamped) linearly onto 12 buckets spanning the full
/// range, each covering `1/6` of the domain (~15°-equivalent in latitude).
pub fn phi_bucket(dy: f64) -> u8 {
    let clamped = dy.clamp(-1.0, 1.0);
    let mapped = (clamped + 1.0) / 2.0 * 12.0;
    let idx = mapped.floor() as i64;
    idx.clamp(0, 11) as u8
}

fn sub_bucket(t: f64, rising: bool) -> i64 {
    let low = if t < TAN_15 {
        0
    } else if t < TAN_30 {
        1
    } else {
        2
    };
    if rising {
        low
    } else {
        2 - low
    }
}

/// Maps a direction's `(dx, dz)` azimuth onto one of 24 buckets of 15° each,
/// without calling `atan2`. Degenerate directions (`dx² + dz² < ε`)
/// deterministically return bucket 0.
pub fn theta_bucket(dx: f64, dz: f64) -> u8 {
    let bucket = theta_bucket_zero_trig(dx, dz);
    #[cfg(debug_assertions)]
    {
        let reference = theta_bucket_trig_reference(dx, dz);
        debug_assert_eq!(
            bucket, reference,
            "zero-trig theta bucket diverged from trig reference for dx={dx} dz={dz}"
        );
    }
    bucket
}

fn theta_bucket_zero_trig(dx: f64, dz: f64) -> u8 {
    if dx * dx + dz * dz < EPS {
        return 0;
    }

    let ax = dx.abs();
    let az = dz.abs();

    // Quadrant tests are written so every axis-aligned tie (dx or dz == 0)
    // resolves toward the quadrant starting just past that angle, matching
    // what `floor(angle_deg / 15)` would do at a clean multiple of 15.
    let (base_octant, takes_first_octant) = if dx > 0.0 && dz >= 0.0 {
        (0, ax > az)
    } else if dx <= 0.0 && dz > 0.0 {
        (2, ax < az)
    } else if dx < 0.0 && dz <= 0.0 {
        (4, ax > az)
    } else {
        (6, ax < az)
    };
    let octant = if takes_first_octant { base_octant } else { base_octant + 1 };
    let rising = octant % 2 == 0;

    let max = ax.max(az);
    let t = if max == 0.0 { 0.0 } else { ax.min(az) / max };
    (octant * 3 + sub_bucket(t, rising)) as u8
}

/// Trig-based reference bucket, compiled only in debug builds, used to
/// cross-check [`theta_bucket`] never diverges from the angle a real
/// `atan2` would compute.
#[cfg(debug_assertions)]
fn theta_bucket_trig_reference(dx: f64, dz: f64) -> u8 {
    if dx * dx + dz * dz < EPS {
        return 0;
    }
    let mut angle_deg = dz.atan2(dx).to_degrees();
    if angle_deg < 0.0 {
        angle_deg += 360.0;
    }
    let idx = (angle_deg / 15.0).floor() as i64;
    idx.clamp(0, 23) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phi_bucket_extremes_and_midpoint() {
        assert_eq!(phi_bucket(-1.0), 0);
        assert_eq!(phi_bucket(1.0), 11);
        assert_eq!(phi_bucket(0.0), 6);
    }

    #[test]
    fn test_phi_bucket_clamps_out_of_range_inputs() {
        assert_eq!(phi_bucket(-5.0), 0);
        assert_eq!(phi_bucket(5.0), 11);
    }

    #[test]
    fn test_theta_bucket_degenerate_direction_is_zero() {
        assert_eq!(theta_bucket(0.0, 0.0), 0);
        assert_eq!(theta_bucket(1e-13, 1e-13), 0);
    }

    #[test]
    fn test_theta_bucket_cardinal_directions() {
        assert_eq!(theta_bucket(1.0, 0.0), 0);
        assert_eq!(theta_bucket(0.0, 1.0), 6);
        assert_eq!(theta_bucket(-1.0, 0.0), 12);
        assert_eq!(theta_bucket(0.0, -1.0), 18);
    }

    #[test]
    fn test_theta_bucket_matches_trig_reference_on_dense_grid() {
        // Skip angles within half a degree of a bucket boundary: both the
        // zero-trig path and the reference path round the exact boundary
        // to whichever side floating-point error happens to land on, so
        // that is not a meaningful disagreement to assert against.
        let near_boundary = |angle: f64| (angle % 15.0).min(15.0 - (angle % 15.0)) < 0.5;

        let mut angle = 0.0f64;
        while angle < 360.0 {
            if !near_boundary(angle) {
                let rad = angle.to_radians();
                let dx = rad.cos();
                let dz = rad.sin();
                let zero_trig = theta_bucket(dx, dz);
                let reference = theta_bucket_trig_reference(dx, dz);
                assert_eq!(
                    zero_trig, reference,
                    "mismatch at angle={angle} dx={dx} dz={dz}"
                );
            }
            angle += 0.41;
        }
    }

    #[test]
    fn test_theta_bucket_is_order_independent_of_call_sequence() {
        // Pure function: repeated calls with the same input are identical.
        let a = theta_bucket(0.3, 0.7);
        let b = theta_bucket(0.3, 0.7);
        assert_eq!(a, b);
    }
}
