//! Path length and speed of each scanner module from tracked positions
//!
//! Records arrive interleaved: record `k` belongs to module `k % module_count`.
//! The first `module_count` records seed each module's last known position.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::MAX_DELTA_MM;
use crate::validation::error::ProcessingError;

/// Parameters of a tracking run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicsSettings {
    pub module_count: usize,
    /// Record rate of each module (Hz)
    pub sample_rate_hz: f64,
    /// Steps at or above this (mm) are tracker glitches and ignored
    pub max_delta_mm: f64,
}

impl KinematicsSettings {
    pub fn new(module_count: usize, sample_rate_hz: f64) -> Self {
        Self {
            module_count,
            sample_rate_hz,
            max_delta_mm: MAX_DELTA_MM,
        }
    }

    fn validate(&self) -> Result<(), ProcessingError> {
        if self.module_count == 0 {
            return Err(ProcessingError::invalid("module count", "must be at least 1"));
        }
        if !(self.sample_rate_hz > 0.0) || !self.sample_rate_hz.is_finite() {
            return Err(ProcessingError::invalid(
                "sample rate",
                format!("must be positive and finite, got {}", self.sample_rate_hz),
            ));
        }
        if !(self.max_delta_mm > 0.0) {
            return Err(ProcessingError::invalid(
                "max delta",
                format!("must be positive, got {}", self.max_delta_mm),
            ));
        }
        Ok(())
    }
}

/// Movement summary of one module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleKinematics {
    /// Zero-based module number
    pub module: usize,
    /// Accepted steps
    pub steps: usize,
    pub movement_time_s: f64,
    pub distance_m: f64,
    /// `None` when the module never moved
    pub average_speed_m_s: Option<f64>,
}

/// Integrate per-module path length over interleaved position records (mm)
pub fn integrate_paths(
    records: &[Vector3<f64>],
    settings: &KinematicsSettings,
) -> Result<Vec<ModuleKinematics>, ProcessingError> {
    settings.validate()?;
    let modules = settings.module_count;
    if records.len() < modules {
        return Err(ProcessingError::InsufficientRecords {
            available: records.len(),
            required: modules,
        });
    }

    let mut previous: Vec<Vector3<f64>> = records[..modules].to_vec();
    let mut distance_mm = vec![0.0; modules];
    let mut steps = vec![0usize; modules];
    let mut rejected = 0usize;

    for (offset, position) in records[modules..].iter().enumerate() {
        let module = offset % modules;
        let delta = (position - previous[module]).norm();
        previous[module] = *position;

        if delta < settings.max_delta_mm {
            distance_mm[module] += delta;
            steps[module] += 1;
        } else {
            rejected += 1;
        }
    }

    debug!(records = records.len(), rejected, "paths integrated");

    Ok((0..modules)
        .map(|module| {
            let movement_time_s = steps[module] as f64 / settings.sample_rate_hz;
            let distance_m = distance_mm[module] / 1000.0;
            let average_speed_m_s = if movement_time_s > 0.0 {
                Some(distance_m / movement_time_s)
            } else {
                None
            };
            ModuleKinematics {
                module,
                steps: steps[module],
                movement_time_s,
                distance_m,
                average_speed_m_s,
            }
        })
        .collect())
}
