//! Construction-time errors.
//!
//! Per-ray numerical failures never surface here: they travel as validity
//! masks or NaN values inside the ray batch.

use thiserror::Error;

/// Errors raised while building optical elements or addressing parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraceError {
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("surface diameter ({diameter}) must be less than twice its radius of curvature ({radius})")]
    ApertureExceedsCurvature { diameter: f64, radius: f64 },

    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
}

/// Result type for element construction.
pub type TraceResult<T> = Result<T, TraceError>;

pub(crate) fn check_positive(name: &'static str, value: f64) -> TraceResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(TraceError::NonPositive { name, value })
    }
}

pub(crate) fn check_finite(name: &'static str, value: f64) -> TraceResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TraceError::NonFinite { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checks() {
        assert_eq!(check_positive("diameter", 2.0), Ok(2.0));
        assert!(check_positive("diameter", 0.0).is_err());
        assert!(check_positive("diameter", f64::NAN).is_err());
        assert!(check_finite("offset", -3.0).is_ok());
        assert!(check_finite("offset", f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = TraceError::ApertureExceedsCurvature {
            diameter: 10.0,
            radius: 4.0,
        };
        assert_eq!(
            err.to_string(),
            "surface diameter (10) must be less than twice its radius of curvature (4)"
        );
        assert_eq!(
            TraceError::UnknownParameter("2.K".into()).to_string(),
            "unknown parameter: 2.K"
        );
    }
}
