//! Region construction, id derivation, and principal-direction geometry
//! (§4.10 steps 6-8).

use crypto_primitives::{sha256, to_hex};

use crate::components::Component;
use crate::grid::CoverageGrid;
use crate::thresholds::{PizThresholds, GRID_CELLS, GRID_N};

pub type Bbox = (usize, usize, usize, usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: String,
    pub pixel_count: usize,
    pub area_ratio: f64,
    pub bbox: Bbox,
    pub centroid: (f64, f64),
    pub principal_direction_unit: (f64, f64),
    pub severity_score: f64,
}

/// `"piz_region_" + hex16(SHA256(BE(min_row, max_row, min_col, max_col, pixel_count)))`.
pub fn region_id(bbox: Bbox, pixel_count: usize) -> String {
    let (min_row, max_row, min_col, max_col) = bbox;
    let mut buf = Vec::with_capacity(4 * 4 + 8);
    buf.extend_from_slice(&(min_row as u32).to_be_bytes());
    buf.extend_from_slice(&(max_row as u32).to_be_bytes());
    buf.extend_from_slice(&(min_col as u32).to_be_bytes());
    buf.extend_from_slice(&(max_col as u32).to_be_bytes());
    buf.extend_from_slice(&(pixel_count as u64).to_be_bytes());
    let digest = sha256(&buf);
    format!("piz_region_{}", &to_hex(&digest)[..16])
}

/// `normalize(farthest bbox corner − centroid)`, evaluating corners in the
/// order `{(min,min), (min,max), (max,min), (max,max)}` and keeping the
/// first corner on a distance tie (so ties resolve toward the
/// lowest-row, lowest-col corner, per spec).
pub fn principal_direction_unit(bbox: Bbox, centroid: (f64, f64)) -> (f64, f64) {
    let (min_row, max_row, min_col, max_col) = bbox;
    let corners = [
        (min_row as f64, min_col as f64),
        (min_row as f64, max_col as f64),
        (max_row as f64, min_col as f64),
        (max_row as f64, max_col as f64),
    ];

    let dist2 = |p: (f64, f64)| {
        let dr = p.0 - centroid.0;
        let dc = p.1 - centroid.1;
        dr * dr + dc * dc
    };

    let mut best = corners[0];
    let mut best_dist = dist2(best);
    for &corner in &corners[1..] {
        let d = dist2(corner);
        if d > best_dist {
            best = corner;
            best_dist = d;
        }
    }

    let dr = best.0 - centroid.0;
    let dc = best.1 - centroid.1;
    let norm = (dr * dr + dc * dc).sqrt();
    if norm < 1e-12 {
        (0.0, 0.0)
    } else {
        (dr / norm, dc / norm)
    }
}

/// `area_ratio >= local_area_ratio_min && local_coverage < local_coverage_min`.
pub fn is_triggered(component: &Component, grid: &CoverageGrid, thresholds: &PizThresholds) -> bool {
    let area_ratio = component.pixel_count() as f64 / GRID_CELLS as f64;
    let local_coverage = grid.bbox_local_coverage(component.bbox(), thresholds.covered_cell_min);
    area_ratio >= thresholds.local_area_ratio_min && local_coverage < thresholds.local_coverage_min
}

pub fn build_region(component: &Component, grid: &CoverageGrid, thresholds: &PizThresholds) -> Region {
    let bbox = component.bbox();
    let pixel_count = component.pixel_count();
    let centroid = component.centroid();
    let local_coverage = grid.bbox_local_coverage(bbox, thresholds.covered_cell_min);

    Region {
        id: region_id(bbox, pixel_count),
        pixel_count,
        area_ratio: pixel_count as f64 / GRID_CELLS as f64,
        bbox,
        centroid,
        principal_direction_unit: principal_direction_unit(bbox, centroid),
        severity_score: (1.0 - local_coverage).clamp(0.0, 1.0),
    }
}

/// A full-grid region synthesized when `global_trigger` is set but no
/// local component triggered (§4.10 step 7). `centroid = ((N−1)/2, (N−1)/2)`
/// and `severity = clamp01(1 − global_coverage)`.
pub fn synthetic_region(global_coverage: f64) -> Region {
    let bbox: Bbox = (0, GRID_N - 1, 0, GRID_N - 1);
    let centroid = ((GRID_N - 1) as f64 / 2.0, (GRID_N - 1) as f64 / 2.0);
    let pixel_count = GRID_CELLS;

    Region {
        id: region_id(bbox, pixel_count),
        pixel_count,
        area_ratio: 1.0,
        bbox,
        centroid,
        principal_direction_unit: principal_direction_unit(bbox, centroid),
        severity_score: (1.0 - global_coverage).clamp(0.0, 1.0),
    }
}

/// Sorts regions by `(bbox.min_row, bbox.min_col, bbox.max_row,
/// bbox.max_col, id)` — never discovery order (§4.10 step 8).
pub fn sort_regions(regions: &mut [Region]) {
    regions.sort_by(|a, b| {
        let (a_min_row, a_max_row, a_min_col, a_max_col) = a.bbox;
        let (b_min_row, b_max_row, b_min_col, b_max_col) = b.bbox;
        (a_min_row, a_min_col, a_max_row, a_max_col, &a.id)
            .cmp(&(b_min_row, b_min_col, b_max_row, b_max_col, &b.id))
    });
}
