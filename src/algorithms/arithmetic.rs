//! First-order uncertainty propagation for the arithmetic used by the scanner model.
//!
//! Uncertainties combine as a worst-case bound: absolute uncertainties add under
//! addition and subtraction, relative uncertainties add under multiplication,
//! division and powers. No quadrature (root-sum-square) combination is used.
//!
//! Relative-uncertainty formulas are evaluated in algebraically equal forms that
//! only divide by the divisor itself, so a zero numerator component (an axis the
//! direction does not touch) propagates cleanly instead of producing `0/0`.

use crate::core::{UncertainScalar, UncertainVector3};
use crate::validation::error::{DomainError, DomainResult};

fn checked(operation: &str, value: f64, uncertainty: f64) -> DomainResult<UncertainScalar> {
    if !value.is_finite() || !uncertainty.is_finite() {
        return Err(DomainError::non_finite(operation));
    }
    UncertainScalar::new(value, uncertainty)
}

/// `a + b`; absolute uncertainties sum
pub fn add(a: &UncertainScalar, b: &UncertainScalar) -> DomainResult<UncertainScalar> {
    checked(
        "add",
        a.value() + b.value(),
        a.uncertainty() + b.uncertainty(),
    )
}

/// `a - b`; absolute uncertainties still sum
pub fn subtract(a: &UncertainScalar, b: &UncertainScalar) -> DomainResult<UncertainScalar> {
    checked(
        "subtract",
        a.value() - b.value(),
        a.uncertainty() + b.uncertainty(),
    )
}

/// Scale by an exact factor
pub fn scale(a: &UncertainScalar, k: f64) -> DomainResult<UncertainScalar> {
    checked("scale", a.value() * k, a.uncertainty() * k.abs())
}

/// `a * b` with `(a.u/a.v + b.u/b.v) * a.v*b.v`, written as `a.u*|b.v| + b.u*|a.v|`
pub fn multiply(a: &UncertainScalar, b: &UncertainScalar) -> DomainResult<UncertainScalar> {
    checked(
        "multiply",
        a.value() * b.value(),
        a.uncertainty() * b.value().abs() + b.uncertainty() * a.value().abs(),
    )
}

/// `a / b` with `(a.u/a.v + b.u/b.v) * (a.v/b.v)`.
///
/// The divisor must be strictly positive.
pub fn divide(a: &UncertainScalar, b: &UncertainScalar) -> DomainResult<UncertainScalar> {
    let divisor = b.value();
    if divisor <= 0.0 {
        return Err(DomainError::zero_or_negative("divisor", divisor));
    }
    checked(
        "divide",
        a.value() / divisor,
        (a.uncertainty() + a.value().abs() * b.uncertainty() / divisor) / divisor,
    )
}

/// `a^p` with `|p| * (a.u/a.v) * a^p`. The base must be strictly positive.
pub fn power(a: &UncertainScalar, p: f64) -> DomainResult<UncertainScalar> {
    let base = a.value();
    if base <= 0.0 {
        return Err(DomainError::zero_or_negative("power base", base));
    }
    let value = base.powf(p);
    checked("power", value, p.abs() * (a.uncertainty() / base) * value)
}

/// `Σ vᵢ²` with uncertainty `Σ 2·(uᵢ/vᵢ)·vᵢ²`, i.e. `Σ 2·uᵢ·|vᵢ|`
pub fn sum_of_squares(components: &[UncertainScalar]) -> DomainResult<UncertainScalar> {
    let (value, uncertainty) = components.iter().fold((0.0, 0.0), |(v, u), c| {
        (
            v + c.value() * c.value(),
            u + 2.0 * c.uncertainty() * c.value().abs(),
        )
    });
    checked("sum of squares", value, uncertainty)
}

// Vector forms

pub fn add_vectors(a: &UncertainVector3, b: &UncertainVector3) -> DomainResult<UncertainVector3> {
    a.try_zip(b, add)
}

pub fn subtract_vectors(a: &UncertainVector3, b: &UncertainVector3) -> DomainResult<UncertainVector3> {
    a.try_zip(b, subtract)
}

/// Multiply every axis by the same uncertain scalar
pub fn multiply_scalar(v: &UncertainVector3, k: &UncertainScalar) -> DomainResult<UncertainVector3> {
    v.try_map(|c| multiply(c, k))
}

/// Divide every axis by the same uncertain scalar
pub fn divide_scalar(v: &UncertainVector3, k: &UncertainScalar) -> DomainResult<UncertainVector3> {
    v.try_map(|c| divide(c, k))
}
