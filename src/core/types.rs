//! Core value types for uncertainty propagation

use crate::validation::error::{DomainError, DomainResult};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A measured or derived quantity with its absolute uncertainty.
///
/// Both fields are finite and the uncertainty is never negative; every
/// constructor checks this, including deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawScalar")]
pub struct UncertainScalar {
    value: f64,
    uncertainty: f64,
}

#[derive(Deserialize)]
struct RawScalar {
    value: f64,
    #[serde(default)]
    uncertainty: f64,
}

impl TryFrom<RawScalar> for UncertainScalar {
    type Error = DomainError;

    fn try_from(raw: RawScalar) -> Result<Self, Self::Error> {
        UncertainScalar::new(raw.value, raw.uncertainty)
    }
}

impl UncertainScalar {
    pub fn new(value: f64, uncertainty: f64) -> DomainResult<Self> {
        if !value.is_finite() || !uncertainty.is_finite() {
            return Err(DomainError::non_finite("scalar construction"));
        }
        if uncertainty < 0.0 {
            return Err(DomainError::NegativeUncertainty {
                quantity: "scalar".to_string(),
                uncertainty,
            });
        }
        Ok(Self { value, uncertainty })
    }

    /// Build from constants already known to satisfy the invariants
    pub(crate) const fn from_trusted(value: f64, uncertainty: f64) -> Self {
        Self { value, uncertainty }
    }

    /// A quantity known without error
    pub fn exact(value: f64) -> DomainResult<Self> {
        Self::new(value, 0.0)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn uncertainty(&self) -> f64 {
        self.uncertainty
    }

    /// `uncertainty / |value|`; `None` when the value is zero
    pub fn relative_uncertainty(&self) -> Option<f64> {
        if self.value == 0.0 {
            None
        } else {
            Some(self.uncertainty / self.value.abs())
        }
    }
}

/// Per-axis uncertain position or displacement. Axes are independent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncertainVector3 {
    pub x: UncertainScalar,
    pub y: UncertainScalar,
    pub z: UncertainScalar,
}

impl UncertainVector3 {
    pub fn new(x: UncertainScalar, y: UncertainScalar, z: UncertainScalar) -> Self {
        Self { x, y, z }
    }

    /// Pair a value vector with its per-axis uncertainties
    pub fn from_parts(values: &Vector3<f64>, uncertainties: &Vector3<f64>) -> DomainResult<Self> {
        Ok(Self {
            x: UncertainScalar::new(values.x, uncertainties.x)?,
            y: UncertainScalar::new(values.y, uncertainties.y)?,
            z: UncertainScalar::new(values.z, uncertainties.z)?,
        })
    }

    pub fn values(&self) -> Vector3<f64> {
        Vector3::new(self.x.value(), self.y.value(), self.z.value())
    }

    pub fn uncertainties(&self) -> Vector3<f64> {
        Vector3::new(self.x.uncertainty(), self.y.uncertainty(), self.z.uncertainty())
    }

    pub fn components(&self) -> [UncertainScalar; 3] {
        [self.x, self.y, self.z]
    }

    /// Apply a fallible scalar operation to every axis
    pub fn try_map<F>(&self, mut op: F) -> DomainResult<Self>
    where
        F: FnMut(&UncertainScalar) -> DomainResult<UncertainScalar>,
    {
        Ok(Self {
            x: op(&self.x)?,
            y: op(&self.y)?,
            z: op(&self.z)?,
        })
    }

    /// Combine two vectors axis by axis with a fallible scalar operation
    pub fn try_zip<F>(&self, other: &Self, mut op: F) -> DomainResult<Self>
    where
        F: FnMut(&UncertainScalar, &UncertainScalar) -> DomainResult<UncertainScalar>,
    {
        Ok(Self {
            x: op(&self.x, &other.x)?,
            y: op(&self.y, &other.y)?,
            z: op(&self.z, &other.z)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_rejects_negative_uncertainty() {
        let err = UncertainScalar::new(1.0, -0.5).unwrap_err();
        assert!(matches!(err, DomainError::NegativeUncertainty { .. }));
    }

    #[test]
    fn test_scalar_rejects_non_finite() {
        assert!(UncertainScalar::new(f64::NAN, 0.0).is_err());
        assert!(UncertainScalar::new(1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_relative_uncertainty() {
        let s = UncertainScalar::new(-200.0, 10.0).unwrap();
        assert_eq!(s.relative_uncertainty(), Some(0.05));
        assert_eq!(UncertainScalar::exact(0.0).unwrap().relative_uncertainty(), None);
    }

    #[test]
    fn test_vector_parts_roundtrip() {
        let values = Vector3::new(1.0, -2.0, 3.0);
        let uncertainties = Vector3::new(0.1, 0.2, 0.3);
        let v = UncertainVector3::from_parts(&values, &uncertainties).unwrap();
        assert_eq!(v.values(), values);
        assert_eq!(v.uncertainties(), uncertainties);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: UncertainScalar = serde_json::from_str(r#"{"value": 490.0, "uncertainty": 10.0}"#).unwrap();
        assert_eq!(ok.value(), 490.0);
        let exact: UncertainScalar = serde_json::from_str(r#"{"value": 5.0}"#).unwrap();
        assert_eq!(exact.uncertainty(), 0.0);
        let bad = serde_json::from_str::<UncertainScalar>(r#"{"value": 1.0, "uncertainty": -1.0}"#);
        assert!(bad.is_err());
    }
}
