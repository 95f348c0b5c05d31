//! Per-sample position uncertainty via each anchor
//!
//! Every sample yields two independent estimates: one walking out from anchor A
//! along the baseline orientation, one walking back from anchor B. Both are
//! always produced so callers can spot calibration or ranging inconsistencies
//! from their disagreement.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::algorithms::arithmetic::{add_vectors, multiply_scalar, subtract_vectors};
use crate::algorithms::baseline::{AnchorCalibration, Baseline, BaselineOrientation};
use crate::core::{UncertainScalar, UncertainVector3, DEFAULT_DIVERGENCE_THRESHOLD_MM};
use crate::validation::error::{DomainError, DomainResult};

/// Measured distances from one scan-path point to both anchors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleMeasurement {
    pub distance_to_a: UncertainScalar,
    pub distance_to_b: UncertainScalar,
}

impl SampleMeasurement {
    pub fn new(distance_to_a: UncertainScalar, distance_to_b: UncertainScalar) -> Self {
        Self {
            distance_to_a,
            distance_to_b,
        }
    }

    /// Sample on the A-B segment: its distance to B is the baseline remainder
    pub fn on_baseline(
        distance_to_a: UncertainScalar,
        baseline_length: f64,
        uncertainty_to_b: f64,
    ) -> DomainResult<Self> {
        let distance_to_b =
            UncertainScalar::new(baseline_length - distance_to_a.value(), uncertainty_to_b)?;
        Ok(Self::new(distance_to_a, distance_to_b))
    }
}

/// Both position estimates for one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleResult {
    /// Position of the sample in the input sequence
    pub index: usize,
    pub position_via_a: UncertainVector3,
    pub position_via_b: UncertainVector3,
}

impl SampleResult {
    /// Per-axis absolute difference between the two uncertainty estimates
    pub fn divergence(&self) -> Vector3<f64> {
        (self.position_via_a.uncertainties() - self.position_via_b.uncertainties()).abs()
    }

    pub fn max_divergence(&self) -> f64 {
        self.divergence().max()
    }
}

/// A sample that could not be evaluated, and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleFailure {
    pub index: usize,
    pub error: DomainError,
}

/// Evaluator knobs that do not change the propagation itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorOptions {
    /// Treat an empty sample sequence as an error instead of an empty result
    pub require_samples: bool,
    /// Per-axis A/B disagreement above which a sample is flagged
    pub divergence_threshold: f64,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            require_samples: false,
            divergence_threshold: DEFAULT_DIVERGENCE_THRESHOLD_MM,
        }
    }
}

/// Outcome of one batch: the shared orientation, successes and failures in input order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Measured A-B distance the run was configured with
    pub baseline: UncertainScalar,
    pub orientation: BaselineOrientation,
    pub results: Vec<SampleResult>,
    pub failures: Vec<SampleFailure>,
    pub divergence_threshold: f64,
}

impl Evaluation {
    pub fn sample_count(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    pub fn failed_indices(&self) -> Vec<usize> {
        self.failures.iter().map(|f| f.index).collect()
    }

    pub fn is_divergent(&self, result: &SampleResult) -> bool {
        result.max_divergence() > self.divergence_threshold
    }

    pub fn divergent_samples(&self) -> impl Iterator<Item = &SampleResult> + '_ {
        self.results.iter().filter(move |r| self.is_divergent(r))
    }
}

/// Stateless batch evaluator over a fixed baseline and anchor calibration
#[derive(Debug, Clone)]
pub struct PositionEvaluator {
    baseline: UncertainScalar,
    orientation: BaselineOrientation,
    anchor_a: UncertainVector3,
    anchor_b: UncertainVector3,
    options: EvaluatorOptions,
}

impl PositionEvaluator {
    /// Compute the baseline orientation once; it is shared by every sample.
    ///
    /// Anchor A is the origin of the scanner frame and anchor B sits at the
    /// end of the baseline displacement.
    pub fn new(
        baseline: &Baseline,
        calibration: &AnchorCalibration,
        options: EvaluatorOptions,
    ) -> DomainResult<Self> {
        let orientation = BaselineOrientation::compute(baseline, calibration)?;
        let anchor_a = UncertainVector3::from_parts(&Vector3::zeros(), &calibration.anchor_a)?;
        let anchor_b = UncertainVector3::from_parts(&orientation.diff.values(), &calibration.anchor_b)?;

        debug!(
            uab = ?orientation.uab.values(),
            uab_uncertainty = ?orientation.uab.uncertainties(),
            "baseline orientation computed"
        );

        Ok(Self {
            baseline: baseline.distance,
            orientation,
            anchor_a,
            anchor_b,
            options,
        })
    }

    pub fn orientation(&self) -> &BaselineOrientation {
        &self.orientation
    }

    pub fn options(&self) -> &EvaluatorOptions {
        &self.options
    }

    /// Evaluate one sample against both anchors
    pub fn evaluate_sample(&self, index: usize, sample: &SampleMeasurement) -> DomainResult<SampleResult> {
        let dai = &sample.distance_to_a;
        let dbi = &sample.distance_to_b;
        if dai.value() <= 0.0 {
            return Err(DomainError::zero_or_negative("distance to A", dai.value()));
        }
        if dbi.value() <= 0.0 {
            return Err(DomainError::zero_or_negative("distance to B", dbi.value()));
        }

        let uab = &self.orientation.uab;
        let dvai = multiply_scalar(uab, dai)?;
        let position_via_a = add_vectors(&self.anchor_a, &dvai)?;

        let dvbi = multiply_scalar(uab, dbi)?;
        let position_via_b = subtract_vectors(&self.anchor_b, &dvbi)?;

        Ok(SampleResult {
            index,
            position_via_a,
            position_via_b,
        })
    }

    /// Evaluate every sample in order.
    ///
    /// A failing sample is recorded against its index and the rest still run.
    /// The only batch-level error is an empty input when samples are required.
    pub fn evaluate(&self, samples: &[SampleMeasurement]) -> DomainResult<Evaluation> {
        let resolved: Vec<DomainResult<SampleMeasurement>> = samples.iter().copied().map(Ok).collect();
        self.evaluate_resolved(&resolved)
    }

    /// Like [`evaluate`](Self::evaluate), for samples whose construction may
    /// already have failed; those failures keep their index in the output.
    pub fn evaluate_resolved(&self, samples: &[DomainResult<SampleMeasurement>]) -> DomainResult<Evaluation> {
        if samples.is_empty() && self.options.require_samples {
            return Err(DomainError::EmptySampleSequence);
        }

        #[cfg(feature = "parallel")]
        let outcomes: Vec<_> = samples
            .par_iter()
            .enumerate()
            .map(|(index, sample)| (index, self.evaluate_outcome(index, sample)))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<_> = samples
            .iter()
            .enumerate()
            .map(|(index, sample)| (index, self.evaluate_outcome(index, sample)))
            .collect();

        let mut results = Vec::with_capacity(samples.len());
        let mut failures = Vec::new();
        for (index, outcome) in outcomes {
            match outcome {
                Ok(result) => {
                    debug!(
                        index,
                        via_a = ?result.position_via_a.uncertainties(),
                        via_b = ?result.position_via_b.uncertainties(),
                        "sample evaluated"
                    );
                    if result.max_divergence() > self.options.divergence_threshold {
                        warn!(
                            index,
                            divergence = result.max_divergence(),
                            threshold = self.options.divergence_threshold,
                            "anchor estimates disagree"
                        );
                    }
                    results.push(result);
                }
                Err(error) => {
                    warn!(index, %error, "sample rejected");
                    failures.push(SampleFailure { index, error });
                }
            }
        }

        info!(
            evaluated = results.len(),
            failed = failures.len(),
            "sample batch complete"
        );

        Ok(Evaluation {
            baseline: self.baseline,
            orientation: self.orientation.clone(),
            results,
            failures,
            divergence_threshold: self.options.divergence_threshold,
        })
    }

    fn evaluate_outcome(&self, index: usize, sample: &DomainResult<SampleMeasurement>) -> DomainResult<SampleResult> {
        match sample {
            Ok(sample) => self.evaluate_sample(index, sample),
            Err(error) => Err(error.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DEFAULT_DISTANCE_UNCERTAINTY_MM, REFERENCE_BASELINE_MM, REFERENCE_SAMPLE_DISTANCES_MM};
    use approx::assert_relative_eq;

    fn reference_evaluator() -> PositionEvaluator {
        PositionEvaluator::new(
            &Baseline::default(),
            &AnchorCalibration::default(),
            EvaluatorOptions::default(),
        )
        .unwrap()
    }

    fn reference_samples() -> Vec<SampleMeasurement> {
        REFERENCE_SAMPLE_DISTANCES_MM
            .iter()
            .map(|&d| {
                let dai = UncertainScalar::new(d, DEFAULT_DISTANCE_UNCERTAINTY_MM).unwrap();
                SampleMeasurement::on_baseline(dai, REFERENCE_BASELINE_MM, DEFAULT_DISTANCE_UNCERTAINTY_MM)
                    .unwrap()
            })
            .collect()
    }

    fn sample(dai: f64, dbi: f64) -> SampleMeasurement {
        SampleMeasurement::new(
            UncertainScalar::new(dai, 5.0).unwrap(),
            UncertainScalar::new(dbi, 5.0).unwrap(),
        )
    }

    #[test]
    fn test_on_baseline_remainder() {
        let s = SampleMeasurement::on_baseline(UncertainScalar::new(110.0, 5.0).unwrap(), 490.0, 5.0).unwrap();
        assert_eq!(s.distance_to_b.value(), 380.0);
        assert_eq!(s.distance_to_b.uncertainty(), 5.0);
    }

    #[test]
    fn test_reference_samples_all_positive() {
        let evaluation = reference_evaluator().evaluate(&reference_samples()).unwrap();
        assert_eq!(evaluation.results.len(), 5);
        assert!(evaluation.failures.is_empty());

        for result in &evaluation.results {
            for u in result.position_via_a.uncertainties().iter() {
                assert!(*u > 0.0);
            }
            for u in result.position_via_b.uncertainties().iter() {
                assert!(*u > 0.0);
            }
        }
    }

    #[test]
    fn test_reference_first_sample_values() {
        let evaluation = reference_evaluator().evaluate(&reference_samples()).unwrap();
        let first = &evaluation.results[0];
        assert_eq!(first.index, 0);

        let via_a = first.position_via_a.uncertainties();
        assert_relative_eq!(via_a.x, 4.232_714_366_182_04, max_relative = 1e-9);
        assert_relative_eq!(via_a.y, 3.848_244_978_426_939, max_relative = 1e-9);
        assert_relative_eq!(via_a.z, 16.746_551_047_317_75, max_relative = 1e-9);

        let via_b = first.position_via_b.uncertainties();
        assert_relative_eq!(via_b.x, 8.647_285_869_537_958, max_relative = 1e-9);
        assert_relative_eq!(via_b.y, 7.245_755_257_293_061_5, max_relative = 1e-9);
        assert_relative_eq!(via_b.z, 33.969_449_072_552_244, max_relative = 1e-9);
    }

    #[test]
    fn test_estimates_agree_in_value() {
        let evaluation = reference_evaluator().evaluate(&reference_samples()).unwrap();
        for (result, &d) in evaluation.results.iter().zip(REFERENCE_SAMPLE_DISTANCES_MM.iter()) {
            let a = result.position_via_a.values();
            let b = result.position_via_b.values();
            assert_relative_eq!(a.z, d, max_relative = 1e-12);
            assert_relative_eq!(b.z, d, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_results_keep_input_order() {
        let samples = vec![sample(390.0, 100.0), sample(110.0, 380.0), sample(255.0, 235.0)];
        let evaluation = reference_evaluator().evaluate(&samples).unwrap();
        let indices: Vec<usize> = evaluation.results.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(evaluation.results[0].position_via_a.z.value() > evaluation.results[1].position_via_a.z.value());
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let evaluator = reference_evaluator();
        let samples = reference_samples();
        let first = evaluator.evaluate(&samples).unwrap();
        let second = evaluator.evaluate(&samples).unwrap();
        assert_eq!(first, second);
        for (a, b) in first.results.iter().zip(second.results.iter()) {
            assert_eq!(
                a.position_via_a.z.uncertainty().to_bits(),
                b.position_via_a.z.uncertainty().to_bits()
            );
        }
    }

    #[test]
    fn test_bad_samples_recorded_and_skipped() {
        let samples = vec![
            sample(110.0, 380.0),
            sample(0.0, 490.0),
            sample(255.0, 235.0),
            sample(500.0, -10.0),
        ];
        let evaluation = reference_evaluator().evaluate(&samples).unwrap();

        assert_eq!(evaluation.sample_count(), 4);
        assert_eq!(evaluation.results.len(), 2);
        assert_eq!(evaluation.failed_indices(), vec![1, 3]);
        for failure in &evaluation.failures {
            assert!(matches!(failure.error, DomainError::ZeroOrNegativeDistance { .. }));
        }
        assert_eq!(evaluation.results[1].index, 2);
    }

    #[test]
    fn test_unresolved_samples_keep_their_index() {
        let samples = vec![
            Ok(sample(110.0, 380.0)),
            Err(DomainError::NegativeUncertainty {
                quantity: "distance to B".to_string(),
                uncertainty: -1.0,
            }),
            Ok(sample(390.0, 100.0)),
        ];
        let evaluation = reference_evaluator().evaluate_resolved(&samples).unwrap();

        assert_eq!(evaluation.sample_count(), 3);
        assert_eq!(evaluation.failed_indices(), vec![1]);
        assert!(matches!(evaluation.failures[0].error, DomainError::NegativeUncertainty { .. }));
        let indices: Vec<usize> = evaluation.results.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(evaluation.baseline, Baseline::default().distance);
    }

    #[test]
    fn test_empty_input() {
        let evaluation = reference_evaluator().evaluate(&[]).unwrap();
        assert!(evaluation.results.is_empty());
        assert!(evaluation.failures.is_empty());

        let strict = PositionEvaluator::new(
            &Baseline::default(),
            &AnchorCalibration::default(),
            EvaluatorOptions {
                require_samples: true,
                ..EvaluatorOptions::default()
            },
        )
        .unwrap();
        assert_eq!(strict.evaluate(&[]), Err(DomainError::EmptySampleSequence));
    }

    #[test]
    fn test_divergence_flagging() {
        let samples = reference_samples();
        let relaxed = reference_evaluator().evaluate(&samples).unwrap();
        assert_eq!(relaxed.divergent_samples().count(), 0);

        let strict = PositionEvaluator::new(
            &Baseline::default(),
            &AnchorCalibration::default(),
            EvaluatorOptions {
                divergence_threshold: 5.0,
                ..EvaluatorOptions::default()
            },
        )
        .unwrap()
        .evaluate(&samples)
        .unwrap();
        // Samples near either anchor disagree most; the midpoint agrees well
        let flagged: Vec<usize> = strict.divergent_samples().map(|r| r.index).collect();
        assert_eq!(flagged, vec![0, 1, 3, 4]);
        assert_relative_eq!(strict.results[0].max_divergence(), 17.222_898_025_234_493, max_relative = 1e-9);
    }

    #[test]
    fn test_invalid_baseline_fails_construction() {
        let baseline = Baseline {
            direction: Vector3::zeros(),
            ..Baseline::default()
        };
        let err = PositionEvaluator::new(&baseline, &AnchorCalibration::default(), EvaluatorOptions::default())
            .unwrap_err();
        assert_eq!(err, DomainError::ZeroVector);
    }
}
