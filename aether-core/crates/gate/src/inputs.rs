//! Gate inputs and their validator (§4.7).

use crate::errors::GateError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateInputs {
    pub theta_span_deg: f64,
    pub phi_span_deg: f64,
    pub l2_plus_count: i64,
    pub l3_count: i64,
    pub reproj_rms_px: f64,
    pub edge_rms_px: f64,
    pub sharpness: f64,
    pub overexposure_ratio: f64,
    pub underexposure_ratio: f64,
}

pub struct GateInputValidator;

impl GateInputValidator {
    /// Validates every field, returning the first violation found in a
    /// fixed field order so the same invalid input always reports the
    /// same reason.
    pub fn validate(inputs: &GateInputs) -> Result<(), GateError> {
        Self::check_finite("theta_span_deg", inputs.theta_span_deg)?;
        Self::check_finite("phi_span_deg", inputs.phi_span_deg)?;
        Self::check_finite("reproj_rms_px", inputs.reproj_rms_px)?;
        Self::check_finite("edge_rms_px", inputs.edge_rms_px)?;
        Self::check_finite("sharpness", inputs.sharpness)?;
        Self::check_finite("overexposure_ratio", inputs.overexposure_ratio)?;
        Self::check_finite("underexposure_ratio", inputs.underexposure_ratio)?;

        Self::check_non_negative("l2_plus_count", inputs.l2_plus_count)?;
        Self::check_non_negative("l3_count", inputs.l3_count)?;

        Self::check_ratio("overexposure_ratio", inputs.overexposure_ratio)?;
        Self::check_ratio("underexposure_ratio", inputs.underexposure_ratio)?;

        Ok(())
    }

    fn check_finite(field: &str, value: f64) -> Result<(), GateError> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(GateError::NonFiniteInput {
                field: field.to_string(),
                value: value.to_string(),
            })
        }
    }

    fn check_non_negative(field: &str, value: i64) -> Result<(), GateError> {
        if value >= 0 {
            Ok(())
        } else {
            Err(GateError::NegativeCount {
                field: field.to_string(),
                value,
            })
        }
    }

    fn check_ratio(field: &str, value: f64) -> Result<(), GateError> {
        if (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(GateError::RatioOutOfRange {
                field: field.to_string(),
                value,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_inputs() -> GateInputs {
        GateInputs {
            theta_span_deg: 180.0,
            phi_span_deg: 90.0,
            l2_plus_count: 20,
            l3_count: 8,
            reproj_rms_px: 0.2,
            edge_rms_px: 0.1,
            sharpness: 1.0,
            overexposure_ratio: 0.05,
            underexposure_ratio: 0.05,
        }
    }

    #[test]
    fn test_validator_accepts_well_formed_inputs() {
        assert!(GateInputValidator::validate(&valid_inputs()).is_ok());
    }

    #[test]
    fn test_validator_rejects_non_finite_field() {
        let mut inputs = valid_inputs();
        inputs.sharpness = f64::NAN;
        assert!(matches!(
            GateInputValidator::validate(&inputs).unwrap_err(),
            GateError::NonFiniteInput { field, .. } if field == "sharpness"
        ));
    }

    #[test]
    fn test_validator_rejects_negative_count() {
        let mut inputs = valid_inputs();
        inputs.l3_count = -1;
        assert!(matches!(
            GateInputValidator::validate(&inputs).unwrap_err(),
            GateError::NegativeCount { field, .. } if field == "l3_count"
        ));
    }

    #[test]
    fn test_validator_rejects_out_of_range_ratio() {
        let mut inputs = valid_inputs();
        inputs.overexposure_ratio = 1.5;
        assert!(matches!(
            GateInputValidator::validate(&inputs).unwrap_err(),
            GateError::RatioOutOfRange { field, .. } if field == "overexposure_ratio"
        ));
    }
}
