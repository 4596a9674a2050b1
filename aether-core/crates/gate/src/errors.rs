use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GateError {
    #[error("field {field} is not finite: {value}")]
    NonFiniteInput { field: String, value: String },

    #[error("field {field} must not be negative: {value}")]
    NegativeCount { field: String, value: i64 },

    #[error("field {field} must be in [0,1], got {value}")]
    RatioOutOfRange { field: String, value: f64 },
}
