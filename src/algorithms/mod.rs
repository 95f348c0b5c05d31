//! Uncertainty propagation through the scanner geometry

pub mod arithmetic;
pub mod baseline;
pub mod evaluator;

pub use baseline::{AnchorCalibration, Baseline, BaselineOrientation};
pub use evaluator::{
    Evaluation, EvaluatorOptions, PositionEvaluator, SampleFailure, SampleMeasurement, SampleResult,
};
