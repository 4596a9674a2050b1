use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PizError {
    #[error("coverage grid must be exactly 32x32, got {rows}x{cols}")]
    WrongShape { rows: usize, cols: usize },

    #[error("cell ({row},{col}) has non-finite or out-of-range value {value}")]
    InvalidCell { row: usize, col: usize, value: f64 },

    #[error("unknown fields in report document: {keys:?}")]
    UnknownFields { keys: Vec<String> },

    #[error("unsupported report schema major version {found}, expected {expected}")]
    UnsupportedMajorVersion { found: u32, expected: u32 },

    #[error("decision-only report must not carry explainability fields")]
    ExplainabilityFieldsInDecisionOnly,

    #[error("malformed report document: {0}")]
    MalformedJson(String),
}
