//! Noise calibration parameters
//!
//! Sensitivity and epsilon, validated once per run

use crate::DpError;

/// Default sensitivity when none is given
pub const DEFAULT_SENSITIVITY: f64 = 1.0;

/// Calibration for the Laplace mechanism
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParams {
    /// Largest change a single record can make to the released value
    sensitivity: f64,
    /// Privacy budget (smaller means more noise)
    epsilon: f64,
}

impl NoiseParams {
    /// Validate and build parameters.
    ///
    /// `epsilon` must be finite and strictly positive; `sensitivity` must be
    /// finite and non-negative.
    pub fn new(sensitivity: f64, epsilon: f64) -> Result<Self, DpError> {
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(DpError::InvalidParameter {
                name: "epsilon",
                value: epsilon,
                reason: "must be a finite number greater than zero",
            });
        }
        if !sensitivity.is_finite() || sensitivity < 0.0 {
            return Err(DpError::InvalidParameter {
                name: "sensitivity",
                value: sensitivity,
                reason: "must be a finite, non-negative number",
            });
        }
        let params = Self {
            sensitivity,
            epsilon,
        };
        // e.g. epsilon = 1e-310 overflows the ratio
        if !params.scale().is_finite() {
            return Err(DpError::InvalidParameter {
                name: "epsilon",
                value: epsilon,
                reason: "too small for the given sensitivity; noise scale overflows",
            });
        }
        Ok(params)
    }

    /// Parameters with the default sensitivity of 1.0
    pub fn with_epsilon(epsilon: f64) -> Result<Self, DpError> {
        Self::new(DEFAULT_SENSITIVITY, epsilon)
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Laplace scale b = sensitivity / epsilon
    pub fn scale(&self) -> f64 {
        self.sensitivity / self.epsilon
    }
}
