//! Construction-time configuration for the detector (§9 "Configuration":
//! no global mutable statics, no runtime-reconfigurable globals).

pub const GRID_N: usize = 32;
pub const GRID_CELLS: usize = GRID_N * GRID_N;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PizThresholds {
    /// A cell at or above this value counts as "covered" for both the
    /// global-coverage fraction and each region's bbox-local coverage.
    pub covered_cell_min: f64,
    /// Below this fraction of covered cells grid-wide, `global_trigger`
    /// is set.
    pub global_coverage_min: f64,
    /// Components smaller than this are dropped as noise before local
    /// triggering is evaluated.
    pub min_region_pixels: usize,
    /// A region's `pixel_count / GRID_CELLS` must be at least this to be
    /// eligible to trigger.
    pub local_area_ratio_min: f64,
    /// A region's bbox-local coverage must be strictly below this to
    /// trigger.
    pub local_coverage_min: f64,
    pub max_reported_regions: usize,
}

impl Default for PizThresholds {
    fn default() -> Self {
        PizThresholds {
            covered_cell_min: 0.5,
            global_coverage_min: 0.85,
            min_region_pixels: 4,
            local_area_ratio_min: 0.01,
            local_coverage_min: 0.5,
            max_reported_regions: 8,
        }
    }
}
