// THEORY:
// The calibration is the single bridge between optics and chemistry in this crate.
// A block's mean gray level is mapped to a salicylic acid concentration fraction with a
// fixed affine transform fitted offline:
//
//     concentration = -(gray - intercept) / scale
//
// Darker blocks (lower gray) read as higher concentration. The constants are treated as
// a black box; they are carried as configuration so tests and alternative fits can
// override them without touching the sampling code.

use crate::error::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};

/// Gray level at which the calibrated concentration is exactly zero.
pub const DEFAULT_INTERCEPT: f64 = 182.56;
/// Gray levels per unit of concentration.
pub const DEFAULT_SCALE: f64 = 3660.7;

/// Affine gray-to-concentration calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub intercept: f64,
    pub scale: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            intercept: DEFAULT_INTERCEPT,
            scale: DEFAULT_SCALE,
        }
    }
}

impl Calibration {
    pub fn new(intercept: f64, scale: f64) -> ScanResult<Self> {
        let calibration = Self { intercept, scale };
        calibration.validate()?;
        Ok(calibration)
    }

    /// Converts a gray intensity into a concentration fraction.
    /// Total: values outside the calibrated range are returned as-is for the caller to filter.
    pub fn concentration(&self, gray: f64) -> f64 {
        -(gray - self.intercept) / self.scale
    }

    pub fn validate(&self) -> ScanResult<()> {
        if !self.intercept.is_finite() {
            return Err(ScanError::InvalidConfig(format!(
                "calibration intercept must be finite, got {}",
                self.intercept
            )));
        }
        // A positive scale keeps concentration strictly decreasing in gray.
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ScanError::InvalidConfig(format!(
                "calibration scale must be finite and positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}
