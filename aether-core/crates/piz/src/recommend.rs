//! `gate_recommendation` with hysteresis and the `recapture_suggestion`
//! priority (§4.10 step 10).
//!
//! The hysteresis band (`ENTER_RECAPTURE_SEVERITY` >
//! `EXIT_RECAPTURE_SEVERITY`) prevents a severity hovering near a single
//! threshold from flapping the recommendation every frame: once recapture
//! has been recommended, severity has to drop further before the system
//! recommends proceeding again.

use crate::region::Region;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateRecommendation {
    Proceed,
    Recapture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecapturePriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RecaptureSuggestion {
    pub priority: RecapturePriority,
    pub worst_region_id: Option<String>,
}

const ENTER_RECAPTURE_SEVERITY: f64 = 0.5;
const EXIT_RECAPTURE_SEVERITY: f64 = 0.4;

fn worst_severity(regions: &[Region]) -> f64 {
    regions.iter().fold(0.0f64, |acc, r| acc.max(r.severity_score))
}

/// Recommends `Recapture` once worst-region severity crosses the entry
/// threshold; once already recommending `Recapture`, stays there until
/// severity drops below the (lower) exit threshold.
pub fn gate_recommendation(regions: &[Region], previous: Option<GateRecommendation>) -> GateRecommendation {
    let severity = worst_severity(regions);
    let threshold = match previous {
        Some(GateRecommendation::Recapture) => EXIT_RECAPTURE_SEVERITY,
        _ => ENTER_RECAPTURE_SEVERITY,
    };
    if severity >= threshold {
        GateRecommendation::Recapture
    } else {
        GateRecommendation::Proceed
    }
}

/// The worst-severity region (ties keep the first in `regions`' existing
/// order, i.e. the bbox-sorted order from [`crate::region::sort_regions`])
/// determines both the suggestion's priority and which region it names.
pub fn recapture_suggestion(regions: &[Region]) -> RecaptureSuggestion {
    let mut worst: Option<&Region> = None;
    for region in regions {
        match worst {
            None => worst = Some(region),
            Some(current) if region.severity_score > current.severity_score => worst = Some(region),
            _ => {}
        }
    }

    match worst {
        None => RecaptureSuggestion {
            priority: RecapturePriority::Low,
            worst_region_id: None,
        },
        Some(region) => {
            let priority = if region.severity_score >= 0.66 {
                RecapturePriority::High
            } else if region.severity_score >= 0.33 {
                RecapturePriority::Medium
            } else {
                RecapturePriority::Low
            };
            RecaptureSuggestion {
                priority,
                worst_region_id: Some(region.id.clone()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region_with_severity(id: &str, severity: f64) -> Region {
        Region {
            id: id.to_string(),
            pixel_count: 10,
            area_ratio: 0.01,
            bbox: (0, 1, 0, 1),
            centroid: (0.5, 0.5),
            principal_direction_unit: (0.0, 0.0),
            severity_score: severity,
        }
    }

    #[test]
    fn test_no_regions_recommends_proceed() {
        assert_eq!(gate_recommendation(&[], None), GateRecommendation::Proceed);
    }

    #[test]
    fn test_high_severity_recommends_recapture() {
        let regions = vec![region_with_severity("r1", 0.9)];
        assert_eq!(gate_recommendation(&regions, None), GateRecommendation::Recapture);
    }

    #[test]
    fn test_hysteresis_keeps_recapture_until_severity_drops_below_exit_threshold() {
        let regions = vec![region_with_severity("r1", 0.45)];
        // Below the entry threshold (0.5) but above the exit threshold (0.4):
        // stays Recapture if we were already recommending it.
        assert_eq!(
            gate_recommendation(&regions, Some(GateRecommendation::Recapture)),
            GateRecommendation::Recapture
        );
        // From a cold start (no previous), the same severity does not enter Recapture.
        assert_eq!(gate_recommendation(&regions, None), GateRecommendation::Proceed);
    }

    #[test]
    fn test_recapture_suggestion_picks_worst_region() {
        let regions = vec![region_with_severity("low", 0.2), region_with_severity("high", 0.8)];
        let suggestion = recapture_suggestion(&regions);
        assert_eq!(suggestion.priority, RecapturePriority::High);
        assert_eq!(suggestion.worst_region_id, Some("high".to_string()));
    }

    #[test]
    fn test_recapture_suggestion_with_no_regions_is_low_priority() {
        let suggestion = recapture_suggestion(&[]);
        assert_eq!(suggestion.priority, RecapturePriority::Low);
        assert_eq!(suggestion.worst_region_id, None);
    }
}
