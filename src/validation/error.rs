use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures raised while propagating uncertainty through the scanner geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum DomainError {
    /// A distance, divisor or root base that must be strictly positive was not
    #[error("{quantity} must be strictly positive, got {value}")]
    ZeroOrNegativeDistance {
        quantity: String,
        value: f64,
    },

    /// The raw orientation reading has no direction to normalize
    #[error("orientation direction is the zero vector")]
    ZeroVector,

    /// Evaluation was asked for at least one sample but received none
    #[error("sample sequence is empty")]
    EmptySampleSequence,

    #[error("uncertainty of {quantity} must be non-negative, got {uncertainty}")]
    NegativeUncertainty {
        quantity: String,
        uncertainty: f64,
    },

    /// An operation overflowed or was fed NaN/infinity
    #[error("{operation} produced a non-finite result")]
    NonFinite {
        operation: String,
    },
}

impl DomainError {
    pub fn zero_or_negative(quantity: impl Into<String>, value: f64) -> Self {
        Self::ZeroOrNegativeDistance {
            quantity: quantity.into(),
            value,
        }
    }

    pub fn non_finite(operation: impl Into<String>) -> Self {
        Self::NonFinite {
            operation: operation.into(),
        }
    }

    /// Short machine-friendly name used in CSV output and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::ZeroOrNegativeDistance { .. } => "ZeroOrNegativeDistance",
            DomainError::ZeroVector => "ZeroVector",
            DomainError::EmptySampleSequence => "EmptySampleSequence",
            DomainError::NegativeUncertainty { .. } => "NegativeUncertainty",
            DomainError::NonFinite { .. } => "NonFinite",
        }
    }
}

/// Result alias for uncertainty arithmetic
pub type DomainResult<T> = Result<T, DomainError>;

/// Failures in the collaborator summaries (path kinematics, RSSI windows)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum ProcessingError {
    #[error("invalid {parameter}: {reason}")]
    InvalidParameter {
        parameter: String,
        reason: String,
    },

    #[error("insufficient records: {available} available, {required} required")]
    InsufficientRecords {
        available: usize,
        required: usize,
    },
}

impl ProcessingError {
    pub fn invalid(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}
