use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::algorithms::baseline::{normalize_direction, AnchorCalibration, Baseline};
use crate::algorithms::evaluator::{EvaluatorOptions, PositionEvaluator, SampleMeasurement};
use crate::core::{UncertainScalar, DEFAULT_DISTANCE_UNCERTAINTY_MM, REFERENCE_SAMPLE_DISTANCES_MM};
use crate::validation::error::{DomainError, DomainResult};

/// Configuration loading and validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Invalid parameter value
    #[error("invalid parameter '{parameter}' = {value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file I/O error
    #[error("I/O error: {message}")]
    IoError { message: String },
    /// JSON serialization/deserialization error
    #[error("serialization error: {message}")]
    SerializationError { message: String },
    /// Geometry that cannot be propagated
    #[error("invalid geometry: {0}")]
    Domain(#[from] DomainError),
}

/// One scan-path sample as written in a scenario file.
///
/// Missing fields fall back to the scenario: `distance_to_b` to the baseline
/// remainder, uncertainties to `default_distance_uncertainty`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSpec {
    pub distance_to_a: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_to_b: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty_to_a: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty_to_b: Option<f64>,
}

impl SampleSpec {
    pub fn along_baseline(distance_to_a: f64) -> Self {
        Self {
            distance_to_a,
            distance_to_b: None,
            uncertainty_to_a: None,
            uncertainty_to_b: None,
        }
    }
}

fn sample_distance(quantity: &str, value: f64, uncertainty: f64) -> DomainResult<UncertainScalar> {
    UncertainScalar::new(value, uncertainty).map_err(|error| match error {
        DomainError::NegativeUncertainty { uncertainty, .. } => DomainError::NegativeUncertainty {
            quantity: quantity.to_string(),
            uncertainty,
        },
        DomainError::NonFinite { .. } => DomainError::non_finite(quantity),
        other => other,
    })
}

fn default_distance_uncertainty() -> f64 {
    DEFAULT_DISTANCE_UNCERTAINTY_MM
}

/// Everything one evaluation run needs, passed explicitly instead of held globally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub baseline: Baseline,
    #[serde(default)]
    pub anchors: AnchorCalibration,
    /// Uncertainty applied to any sample distance that does not carry its own (mm)
    #[serde(default = "default_distance_uncertainty")]
    pub default_distance_uncertainty: f64,
    #[serde(default)]
    pub samples: Vec<SampleSpec>,
    #[serde(default)]
    pub evaluator: EvaluatorOptions,
}

impl Default for ScenarioConfig {
    /// The reference scanner: 490 mm baseline and five points along it
    fn default() -> Self {
        Self {
            baseline: Baseline::default(),
            anchors: AnchorCalibration::default(),
            default_distance_uncertainty: DEFAULT_DISTANCE_UNCERTAINTY_MM,
            samples: REFERENCE_SAMPLE_DISTANCES_MM
                .iter()
                .map(|&d| SampleSpec::along_baseline(d))
                .collect(),
            evaluator: EvaluatorOptions::default(),
        }
    }
}

impl ScenarioConfig {
    /// Load a scenario from a JSON file and validate it
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;

        let config: ScenarioConfig = serde_json::from_str(&content).map_err(|e| {
            ConfigError::SerializationError {
                message: format!("Failed to parse config file '{}': {}", path_str, e),
            }
        })?;

        for warning in config.validate()? {
            warn!(path = %path_str, "{}", warning);
        }
        debug!(path = %path_str, samples = config.samples.len(), "scenario loaded");
        Ok(config)
    }

    /// Save the scenario as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializationError {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })
    }

    /// Check the scenario; returns non-fatal warnings.
    ///
    /// Degenerate individual samples are only warned about: the evaluator
    /// reports them per sample instead of rejecting the whole run.
    pub fn validate(&self) -> Result<Vec<String>, ConfigError> {
        let baseline_length = self.baseline.distance.value();
        if baseline_length <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "baseline.distance".to_string(),
                value: baseline_length.to_string(),
                reason: "must be strictly positive".to_string(),
            });
        }
        normalize_direction(&self.baseline.direction)?;
        self.anchors.validate()?;

        if !(self.default_distance_uncertainty >= 0.0) || !self.default_distance_uncertainty.is_finite() {
            return Err(ConfigError::InvalidParameter {
                parameter: "default_distance_uncertainty".to_string(),
                value: self.default_distance_uncertainty.to_string(),
                reason: "must be finite and non-negative".to_string(),
            });
        }
        if !(self.evaluator.divergence_threshold > 0.0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "evaluator.divergence_threshold".to_string(),
                value: self.evaluator.divergence_threshold.to_string(),
                reason: "must be strictly positive".to_string(),
            });
        }

        let mut warnings = Vec::new();
        if self.samples.is_empty() {
            warnings.push("no samples configured".to_string());
        }
        for (index, sample) in self.samples.iter().enumerate() {
            if sample.distance_to_a <= 0.0 {
                warnings.push(format!("sample {} has a non-positive distance to A", index));
            }
            let distance_to_b = sample.distance_to_b.unwrap_or(baseline_length - sample.distance_to_a);
            if distance_to_b <= 0.0 {
                warnings.push(format!("sample {} has a non-positive distance to B", index));
            }
        }
        Ok(warnings)
    }

    /// Resolve sample specs into measurements, filling in scenario defaults.
    ///
    /// One outcome per sample, in order: a malformed entry fails on its own
    /// and is reported by the evaluator against its index.
    pub fn measurements(&self) -> Vec<DomainResult<SampleMeasurement>> {
        let baseline_length = self.baseline.distance.value();
        let fallback = self.default_distance_uncertainty;

        self.samples
            .iter()
            .map(|spec| {
                let to_a = sample_distance(
                    "distance to A",
                    spec.distance_to_a,
                    spec.uncertainty_to_a.unwrap_or(fallback),
                )?;
                let to_b = sample_distance(
                    "distance to B",
                    spec.distance_to_b.unwrap_or(baseline_length - spec.distance_to_a),
                    spec.uncertainty_to_b.unwrap_or(fallback),
                )?;
                Ok(SampleMeasurement::new(to_a, to_b))
            })
            .collect()
    }

    /// Build the evaluator this scenario describes
    pub fn evaluator(&self) -> Result<PositionEvaluator, ConfigError> {
        Ok(PositionEvaluator::new(
            &self.baseline,
            &self.anchors,
            self.evaluator.clone(),
        )?)
    }
}
