use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::algorithms::arithmetic::{divide_scalar, power, sum_of_squares};
use crate::core::{
    UncertainScalar, UncertainVector3, ANCHOR_A_UNCERTAINTY_MM, ANCHOR_B_UNCERTAINTY_MM,
    REFERENCE_BASELINE_MM, REFERENCE_BASELINE_UNCERTAINTY_MM, REFERENCE_DIRECTION, ROOT_EXPONENT,
};
use crate::validation::error::{DomainError, DomainResult};

/// Measured separation of anchors A and B plus the raw scanner orientation reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Distance from anchor A to anchor B
    pub distance: UncertainScalar,
    /// Unnormalized direction from A towards B
    pub direction: Vector3<f64>,
}

impl Default for Baseline {
    fn default() -> Self {
        Self {
            distance: UncertainScalar::from_trusted(
                REFERENCE_BASELINE_MM,
                REFERENCE_BASELINE_UNCERTAINTY_MM,
            ),
            direction: Vector3::from(REFERENCE_DIRECTION),
        }
    }
}

/// Calibrated per-axis position uncertainty of the two fixed anchors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorCalibration {
    pub anchor_a: Vector3<f64>,
    pub anchor_b: Vector3<f64>,
}

impl Default for AnchorCalibration {
    fn default() -> Self {
        Self {
            anchor_a: Vector3::from(ANCHOR_A_UNCERTAINTY_MM),
            anchor_b: Vector3::from(ANCHOR_B_UNCERTAINTY_MM),
        }
    }
}

impl AnchorCalibration {
    pub fn validate(&self) -> DomainResult<()> {
        for (label, v) in [("anchor A", &self.anchor_a), ("anchor B", &self.anchor_b)] {
            for &u in v.iter() {
                if !u.is_finite() {
                    return Err(DomainError::non_finite(format!("{} calibration", label)));
                }
                if u < 0.0 {
                    return Err(DomainError::NegativeUncertainty {
                        quantity: format!("{} calibration", label),
                        uncertainty: u,
                    });
                }
            }
        }
        Ok(())
    }

    /// Combined uncertainty of both endpoints of the baseline
    pub fn combined(&self) -> Vector3<f64> {
        self.anchor_a + self.anchor_b
    }
}

/// Scale a raw direction reading to unit length
pub fn normalize_direction(direction: &Vector3<f64>) -> DomainResult<Vector3<f64>> {
    let norm = direction.norm();
    if !norm.is_finite() || norm == 0.0 {
        return Err(DomainError::ZeroVector);
    }
    Ok(direction / norm)
}

/// Unit orientation of the baseline with every intermediate of its propagation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineOrientation {
    /// Normalized direction reading
    pub normalized: Vector3<f64>,
    /// A-to-B displacement, uncertain by both anchors' calibration
    pub diff: UncertainVector3,
    /// Squared length of `diff`
    pub sqrsum: UncertainScalar,
    /// Length of `diff`
    pub magnitude: UncertainScalar,
    /// Unit vector from A to B with propagated uncertainty
    pub uab: UncertainVector3,
}

impl BaselineOrientation {
    /// Propagate the anchor calibration through the baseline geometry.
    ///
    /// The displacement takes its per-axis uncertainty from the two anchors
    /// rather than from the baseline distance measurement.
    pub fn compute(baseline: &Baseline, calibration: &AnchorCalibration) -> DomainResult<Self> {
        let distance = baseline.distance.value();
        if distance <= 0.0 {
            return Err(DomainError::zero_or_negative("baseline distance", distance));
        }
        calibration.validate()?;

        let normalized = normalize_direction(&baseline.direction)?;
        let diff = UncertainVector3::from_parts(&(normalized * distance), &calibration.combined())?;

        let sqrsum = sum_of_squares(&diff.components())?;
        let magnitude = power(&sqrsum, ROOT_EXPONENT)?;
        let uab = divide_scalar(&diff, &magnitude)?;

        Ok(Self {
            normalized,
            diff,
            sqrsum,
            magnitude,
            uab,
        })
    }
}
