//! The versioned, closed-world PIZ report (§4.10, schema version `1.0.0`).
//!
//! `DecisionOnly` carries just enough for the capture UI to act;
//! `FullExplainability` additionally carries per-region geometry for
//! debugging/telemetry. Decoders enforce `major` equality and, at the
//! decoder's own `minor`, reject unknown keys; a document with a higher
//! `minor` than the decoder knows about is allowed to carry extra keys
//! (open-set tolerance for older consumers reading newer documents).

use serde_json::{json, Value};

use crate::errors::PizError;
use crate::float_canon::canonicalize;
use crate::recommend::{GateRecommendation, RecaptureSuggestion, RecapturePriority};
use crate::region::Region;

pub const SCHEMA_MAJOR: u32 = 1;
pub const SCHEMA_MINOR: u32 = 0;

/// A fixed sentinel (not wall-clock) timestamp for reports produced from
/// an invalid grid, so `INSUFFICIENT_DATA` reports are byte-identical
/// regardless of when validation failed.
pub const INSUFFICIENT_DATA_EPOCH_NS: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportProfile {
    DecisionOnly,
    FullExplainability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Ok,
    InsufficientData,
}

impl ReportStatus {
    fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Ok => "OK",
            ReportStatus::InsufficientData => "INSUFFICIENT_DATA",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "OK" => Some(ReportStatus::Ok),
            "INSUFFICIENT_DATA" => Some(ReportStatus::InsufficientData),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionDetail {
    pub id: String,
    pub pixel_count: usize,
    pub area_ratio: f64,
    pub bbox: (usize, usize, usize, usize),
    pub centroid: (f64, f64),
    pub principal_direction_unit: (f64, f64),
    pub severity_score: f64,
}

impl From<&Region> for RegionDetail {
    fn from(r: &Region) -> Self {
        RegionDetail {
            id: r.id.clone(),
            pixel_count: r.pixel_count,
            area_ratio: canonicalize(r.area_ratio),
            bbox: r.bbox,
            centroid: (canonicalize(r.centroid.0), canonicalize(r.centroid.1)),
            principal_direction_unit: (
                canonicalize(r.principal_direction_unit.0),
                canonicalize(r.principal_direction_unit.1),
            ),
            severity_score: canonicalize(r.severity_score),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportBody {
    DecisionOnly { region_count: usize },
    FullExplainability {
        regions: Vec<RegionDetail>,
        total_regions_before_truncation: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub status: ReportStatus,
    pub global_trigger: bool,
    pub global_coverage: f64,
    pub gate_recommendation: GateRecommendation,
    pub recapture_suggestion: RecaptureSuggestion,
    pub body: ReportBody,
    pub timestamp_ns: u64,
}

impl Report {
    pub fn insufficient_data() -> Self {
        Report {
            status: ReportStatus::InsufficientData,
            global_trigger: false,
            global_coverage: 0.0,
            gate_recommendation: GateRecommendation::Proceed,
            recapture_suggestion: RecaptureSuggestion {
                priority: RecapturePriority::Low,
                worst_region_id: None,
            },
            body: ReportBody::DecisionOnly { region_count: 0 },
            timestamp_ns: INSUFFICIENT_DATA_EPOCH_NS,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut obj = serde_json::Map::new();
        obj.insert(
            "schema_version".to_string(),
            json!(format!("{SCHEMA_MAJOR}.{SCHEMA_MINOR}.0")),
        );
        obj.insert("status".to_string(), json!(self.status.as_str()));
        obj.insert("global_trigger".to_string(), json!(self.global_trigger));
        obj.insert("global_coverage".to_string(), json!(canonicalize(self.global_coverage)));
        obj.insert(
            "gate_recommendation".to_string(),
            json!(match self.gate_recommendation {
                GateRecommendation::Proceed => "proceed",
                GateRecommendation::Recapture => "recapture",
            }),
        );
        obj.insert(
            "recapture_suggestion".to_string(),
            json!({
                "priority": match self.recapture_suggestion.priority {
                    RecapturePriority::High => "high",
                    RecapturePriority::Medium => "medium",
                    RecapturePriority::Low => "low",
                },
                "worst_region_id": self.recapture_suggestion.worst_region_id,
            }),
        );
        obj.insert("timestamp_ns".to_string(), json!(self.timestamp_ns));

        match &self.body {
            ReportBody::DecisionOnly { region_count } => {
                obj.insert("region_count".to_string(), json!(region_count));
            }
            ReportBody::FullExplainability {
                regions,
                total_regions_before_truncation,
            } => {
                obj.insert(
                    "regions".to_string(),
                    json!(regions
                        .iter()
                        .map(|r| {
                            json!({
                                "id": r.id,
                                "pixel_count": r.pixel_count,
                                "area_ratio": r.area_ratio,
                                "bbox": {
                                    "min_row": r.bbox.0, "max_row": r.bbox.1,
                                    "min_col": r.bbox.2, "max_col": r.bbox.3,
                                },
                                "centroid": {"row": r.centroid.0, "col": r.centroid.1},
                                "principal_direction_unit": {
                                    "row": r.principal_direction_unit.0,
                                    "col": r.principal_direction_unit.1,
                                },
                                "severity_score": r.severity_score,
                            })
                        })
                        .collect::<Vec<_>>()),
                );
                obj.insert(
                    "total_regions_before_truncation".to_string(),
                    json!(total_regions_before_truncation),
                );
            }
        }

        Value::Object(obj)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(&self.to_json()).expect("report json is always serializable")
    }
}

const DECISION_ONLY_KEYS: &[&str] = &[
    "schema_version",
    "status",
    "global_trigger",
    "global_coverage",
    "gate_recommendation",
    "recapture_suggestion",
    "timestamp_ns",
    "region_count",
];
const FULL_EXPLAINABILITY_KEYS: &[&str] = &[
    "schema_version",
    "status",
    "global_trigger",
    "global_coverage",
    "gate_recommendation",
    "recapture_suggestion",
    "timestamp_ns",
    "regions",
    "total_regions_before_truncation",
];
const EXPLAINABILITY_ONLY_KEYS: &[&str] = &["regions", "total_regions_before_truncation"];

fn parse_schema_version(raw: &str) -> Result<(u32, u32), PizError> {
    let mut parts = raw.split('.');
    let major: u32 = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| PizError::MalformedJson("invalid schema_version".to_string()))?;
    let minor: u32 = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| PizError::MalformedJson("invalid schema_version".to_string()))?;
    Ok((major, minor))
}

/// Strict closed-world decode at `(SCHEMA_MAJOR, SCHEMA_MINOR)`: unknown
/// keys fail. A document whose `minor` is higher than `SCHEMA_MINOR` is
/// allowed unknown keys (a newer producer, older decoder). `profile ==
/// DecisionOnly` additionally rejects any explainability-only key.
pub fn decode(bytes: &[u8], profile: ReportProfile) -> Result<Report, PizError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| PizError::MalformedJson(e.to_string()))?;
    let obj = value
        .as_object()
        .ok_or_else(|| PizError::MalformedJson("report must be a JSON object".to_string()))?;

    let schema_version_str = obj
        .get("schema_version")
        .and_then(Value::as_str)
        .ok_or_else(|| PizError::MalformedJson("missing schema_version".to_string()))?;
    let (major, minor) = parse_schema_version(schema_version_str)?;
    if major != SCHEMA_MAJOR {
        return Err(PizError::UnsupportedMajorVersion {
            found: major,
            expected: SCHEMA_MAJOR,
        });
    }

    let known_keys = match profile {
        ReportProfile::DecisionOnly => DECISION_ONLY_KEYS,
        ReportProfile::FullExplainability => FULL_EXPLAINABILITY_KEYS,
    };

    if profile == ReportProfile::DecisionOnly {
        for key in EXPLAINABILITY_ONLY_KEYS {
            if obj.contains_key(*key) {
                return Err(PizError::ExplainabilityFieldsInDecisionOnly);
            }
        }
    }

    if minor <= SCHEMA_MINOR {
        let unknown: Vec<String> = obj.keys().filter(|k| !known_keys.contains(&k.as_str())).cloned().collect();
        if !unknown.is_empty() {
            return Err(PizError::UnknownFields { keys: unknown });
        }
    }

    let status_str = obj
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| PizError::MalformedJson("missing status".to_string()))?;
    let status = ReportStatus::from_str(status_str)
        .ok_or_else(|| PizError::MalformedJson(format!("invalid status {status_str}")))?;

    let global_trigger = obj
        .get("global_trigger")
        .and_then(Value::as_bool)
        .ok_or_else(|| PizError::MalformedJson("missing global_trigger".to_string()))?;
    let global_coverage = obj
        .get("global_coverage")
        .and_then(Value::as_f64)
        .ok_or_else(|| PizError::MalformedJson("missing global_coverage".to_string()))?;
    let timestamp_ns = obj
        .get("timestamp_ns")
        .and_then(Value::as_u64)
        .ok_or_else(|| PizError::MalformedJson("missing timestamp_ns".to_string()))?;

    let rec_str = obj
        .get("gate_recommendation")
        .and_then(Value::as_str)
        .ok_or_else(|| PizError::MalformedJson("missing gate_recommendation".to_string()))?;
    let gate_recommendation = match rec_str {
        "proceed" => GateRecommendation::Proceed,
        "recapture" => GateRecommendation::Recapture,
        other => return Err(PizError::MalformedJson(format!("invalid gate_recommendation {other}"))),
    };

    let suggestion_obj = obj
        .get("recapture_suggestion")
        .and_then(Value::as_object)
        .ok_or_else(|| PizError::MalformedJson("missing recapture_suggestion".to_string()))?;
    let priority_str = suggestion_obj
        .get("priority")
        .and_then(Value::as_str)
        .ok_or_else(|| PizError::MalformedJson("missing recapture_suggestion.priority".to_string()))?;
    let priority = match priority_str {
        "high" => RecapturePriority::High,
        "medium" => RecapturePriority::Medium,
        "low" => RecapturePriority::Low,
        other => return Err(PizError::MalformedJson(format!("invalid priority {other}"))),
    };
    let worst_region_id = suggestion_obj
        .get("worst_region_id")
        .and_then(|v| if v.is_null() { None } else { v.as_str().map(|s| s.to_string()) });

    let body = match profile {
        ReportProfile::DecisionOnly => {
            let region_count = obj.get("region_count").and_then(Value::as_u64).unwrap_or(0) as usize;
            ReportBody::DecisionOnly { region_count }
        }
        ReportProfile::FullExplainability => {
            let regions_value = obj.get("regions").and_then(Value::as_array).cloned().unwrap_or_default();
            let mut regions = Vec::with_capacity(regions_value.len());
            for region_value in &regions_value {
                regions.push(decode_region_detail(region_value)?);
            }
            let total_regions_before_truncation = obj
                .get("total_regions_before_truncation")
                .and_then(Value::as_u64)
                .unwrap_or(regions.len() as u64) as usize;
            ReportBody::FullExplainability {
                regions,
                total_regions_before_truncation,
            }
        }
    };

    Ok(Report {
        status,
        global_trigger,
        global_coverage,
        gate_recommendation,
        recapture_suggestion: RecaptureSuggestion { priority, worst_region_id },
        body,
        timestamp_ns,
    })
}

fn decode_region_detail(value: &Value) -> Result<RegionDetail, PizError> {
    let obj = value
        .as_object()
        .ok_or_else(|| PizError::MalformedJson("region must be an object".to_string()))?;
    let id = obj
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| PizError::MalformedJson("region missing id".to_string()))?
        .to_string();
    let pixel_count = obj
        .get("pixel_count")
        .and_then(Value::as_u64)
        .ok_or_else(|| PizError::MalformedJson("region missing pixel_count".to_string()))? as usize;
    let area_ratio = obj
        .get("area_ratio")
        .and_then(Value::as_f64)
        .ok_or_else(|| PizError::MalformedJson("region missing area_ratio".to_string()))?;
    let bbox_obj = obj
        .get("bbox")
        .and_then(Value::as_object)
        .ok_or_else(|| PizError::MalformedJson("region missing bbox".to_string()))?;
    let bbox_field = |k: &str| -> Result<usize, PizError> {
        bbox_obj
            .get(k)
            .and_then(Value::as_u64)
            .map(|v| v as usize)
            .ok_or_else(|| PizError::MalformedJson(format!("bbox missing {k}")))
    };
    let bbox = (bbox_field("min_row")?, bbox_field("max_row")?, bbox_field("min_col")?, bbox_field("max_col")?);

    let centroid_obj = obj
        .get("centroid")
        .and_then(Value::as_object)
        .ok_or_else(|| PizError::MalformedJson("region missing centroid".to_string()))?;
    let centroid = (
        centroid_obj.get("row").and_then(Value::as_f64).unwrap_or(0.0),
        centroid_obj.get("col").and_then(Value::as_f64).unwrap_or(0.0),
    );

    let dir_obj = obj
        .get("principal_direction_unit")
        .and_then(Value::as_object)
        .ok_or_else(|| PizError::MalformedJson("region missing principal_direction_unit".to_string()))?;
    let principal_direction_unit = (
        dir_obj.get("row").and_then(Value::as_f64).unwrap_or(0.0),
        dir_obj.get("col").and_then(Value::as_f64).unwrap_or(0.0),
    );

    let severity_score = obj
        .get("severity_score")
        .and_then(Value::as_f64)
        .ok_or_else(|| PizError::MalformedJson("region missing severity_score".to_string()))?;

    Ok(RegionDetail {
        id,
        pixel_count,
        area_ratio,
        bbox,
        centroid,
        principal_direction_unit,
        severity_score,
    })
}
