//! Scanner Positioning Uncertainty
//!
//! Propagates baseline, anchor calibration and ranging uncertainty through the
//! two-anchor scanner geometry to a per-sample position uncertainty, estimated
//! independently from each anchor.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod validation;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use crate::core::{UncertainScalar, UncertainVector3};
pub use crate::algorithms::{
    AnchorCalibration, Baseline, BaselineOrientation, Evaluation, EvaluatorOptions,
    PositionEvaluator, SampleFailure, SampleMeasurement, SampleResult,
};
pub use crate::validation::{DomainError, DomainResult, ProcessingError};
pub use crate::utils::{ConfigError, SampleSpec, ScenarioConfig};
pub use crate::api::{render, CsvFormatter, JsonFormatter, OutputFormat, TextFormatter, UncertaintyReport};
