//! Three-factor deterministic quality gate (§4.7): validated inputs,
//! three gains built on `aether-canon`'s stable sigmoid, a weighted
//! `gate_quality`, and a computed worst-case fallback for invalid input.

pub mod errors;
pub mod gains;
pub mod inputs;

pub use errors::GateError;
pub use gains::{basic_gain, fallback_quality, gate_quality, geom_gain, view_gain, GateConfig, GateWeights};
pub use inputs::{GateInputValidator, GateInputs};
