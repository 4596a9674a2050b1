//! Byte-exact canonical encoding and deterministic scalar math shared by
//! every crate that must hash or score the same bytes on every platform.
//!
//! This crate intentionally never touches `f64` formatting directly: floats
//! are converted to fixed-point scaled integers (`Q01`, or the manifest's
//! nine-digit `unit_scale` encoding) before they ever reach the byte writer
//! in [`encoder`]. There is no code path that asks a floating-point
//! formatting routine to produce hash input.

pub mod encoder;
pub mod quantize;

pub use encoder::{CanonValue, CanonWriter};
pub use quantize::{round_half_away_from_zero, sigma_lut, sigma_stable, Q01, TierContext};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CanonError {
    #[error("value {0} is not finite and cannot be canonically encoded")]
    NonFiniteValue(String),
    #[error("fixed-point value out of range: {0}")]
    FixedPointOutOfRange(String),
}

pub type CanonResult<T> = Result<T, CanonError>;
