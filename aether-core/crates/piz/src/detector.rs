//! Top-level PIZ pipeline (§4.10, steps 1-10): validate the grid, find
//! under-covered regions, score and filter them, and assemble a report.

use crate::components::find_components;
use crate::errors::PizError;
use crate::recommend::{gate_recommendation, recapture_suggestion, GateRecommendation};
use crate::region::{build_region, is_triggered, sort_regions, synthetic_region, Region};
use crate::report::{Report, ReportBody, ReportProfile, ReportStatus};
use crate::thresholds::PizThresholds;

/// Runs the full detection pipeline over a raw (unvalidated) 32x32 grid.
///
/// `previous_recommendation` feeds the hysteresis band in
/// [`gate_recommendation`]; pass `None` on the first frame of a session.
/// `timestamp_ns` is the capture timestamp to stamp on a successful
/// report — on validation failure the report instead carries the fixed
/// `INSUFFICIENT_DATA` sentinel timestamp, never the caller's clock.
pub fn detect(
    raw_grid: &[Vec<f64>],
    thresholds: &PizThresholds,
    profile: ReportProfile,
    previous_recommendation: Option<GateRecommendation>,
    timestamp_ns: u64,
) -> Result<Report, PizError> {
    let grid = match crate::grid::CoverageGrid::validate(raw_grid) {
        Ok(grid) => grid,
        Err(_) => return Ok(Report::insufficient_data()),
    };

    let global_coverage = grid.global_coverage(thresholds.covered_cell_min);
    let global_trigger = global_coverage < thresholds.global_coverage_min;

    let components = find_components(&grid, thresholds.covered_cell_min);
    let significant: Vec<_> = components
        .into_iter()
        .filter(|c| c.pixel_count() >= thresholds.min_region_pixels)
        .collect();

    let mut regions: Vec<Region> = significant
        .iter()
        .filter(|c| is_triggered(c, &grid, thresholds))
        .map(|c| build_region(c, &grid, thresholds))
        .collect();

    if global_trigger && regions.is_empty() {
        regions.push(synthetic_region(global_coverage));
    }

    sort_regions(&mut regions);

    let total_regions_before_truncation = regions.len();
    if regions.len() > thresholds.max_reported_regions {
        regions.truncate(thresholds.max_reported_regions);
    }

    let recommendation = gate_recommendation(&regions, previous_recommendation);
    let suggestion = recapture_suggestion(&regions);

    let body = match profile {
        ReportProfile::DecisionOnly => ReportBody::DecisionOnly {
            region_count: regions.len(),
        },
        ReportProfile::FullExplainability => ReportBody::FullExplainability {
            regions: regions.iter().map(Into::into).collect(),
            total_regions_before_truncation,
        },
    };

    Ok(Report {
        status: ReportStatus::Ok,
        global_trigger,
        global_coverage,
        gate_recommendation: recommendation,
        recapture_suggestion: suggestion,
        body,
        timestamp_ns,
    })
}
