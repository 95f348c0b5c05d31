//! Report output formatting
//!
//! An [`Evaluation`] is first flattened into an [`UncertaintyReport`], which the
//! text, JSON and CSV formatters render.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::algorithms::evaluator::Evaluation;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Orientation section of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrientationSummary {
    pub normalized: Vector3<f64>,
    pub unit: Vector3<f64>,
    pub unit_uncertainty: Vector3<f64>,
    /// Baseline distance as measured
    pub measured_baseline: f64,
    pub measured_baseline_uncertainty: f64,
    /// Length of the A-B displacement, uncertain by the anchor calibration
    pub magnitude: f64,
    pub magnitude_uncertainty: f64,
}

/// Both estimates of one successfully evaluated sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleReport {
    pub index: usize,
    pub position_via_a: Vector3<f64>,
    pub uncertainty_via_a: Vector3<f64>,
    pub position_via_b: Vector3<f64>,
    pub uncertainty_via_b: Vector3<f64>,
    pub max_divergence: f64,
    pub divergent: bool,
}

/// A rejected sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    pub index: usize,
    pub kind: String,
    pub reason: String,
}

/// Serializable view of a whole evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyReport {
    pub orientation: OrientationSummary,
    pub samples: Vec<SampleReport>,
    pub failures: Vec<FailureReport>,
    pub divergence_threshold: f64,
}

impl From<&Evaluation> for UncertaintyReport {
    fn from(evaluation: &Evaluation) -> Self {
        let orientation = &evaluation.orientation;
        Self {
            orientation: OrientationSummary {
                normalized: orientation.normalized,
                unit: orientation.uab.values(),
                unit_uncertainty: orientation.uab.uncertainties(),
                measured_baseline: evaluation.baseline.value(),
                measured_baseline_uncertainty: evaluation.baseline.uncertainty(),
                magnitude: orientation.magnitude.value(),
                magnitude_uncertainty: orientation.magnitude.uncertainty(),
            },
            samples: evaluation
                .results
                .iter()
                .map(|r| SampleReport {
                    index: r.index,
                    position_via_a: r.position_via_a.values(),
                    uncertainty_via_a: r.position_via_a.uncertainties(),
                    position_via_b: r.position_via_b.values(),
                    uncertainty_via_b: r.position_via_b.uncertainties(),
                    max_divergence: r.max_divergence(),
                    divergent: evaluation.is_divergent(r),
                })
                .collect(),
            failures: evaluation
                .failures
                .iter()
                .map(|f| FailureReport {
                    index: f.index,
                    kind: f.error.kind().to_string(),
                    reason: f.error.to_string(),
                })
                .collect(),
            divergence_threshold: evaluation.divergence_threshold,
        }
    }
}

/// Human-readable report, one line per estimate
pub struct TextFormatter {
    pub precision: usize,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self { precision: 6 }
    }
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_precision(precision: usize) -> Self {
        Self { precision }
    }

    fn vector(&self, v: &Vector3<f64>) -> String {
        let p = self.precision;
        format!("[{:.p$}, {:.p$}, {:.p$}]", v.x, v.y, v.z, p = p)
    }

    pub fn format_text(&self, report: &UncertaintyReport) -> String {
        let mut out = String::new();
        let o = &report.orientation;

        // Writing to a String cannot fail
        let _ = writeln!(out, "Scanner rotation: {}", self.vector(&o.normalized));
        let _ = writeln!(
            out,
            "Unit orientation: {} +/- {}",
            self.vector(&o.unit),
            self.vector(&o.unit_uncertainty)
        );
        let _ = writeln!(
            out,
            "Measured baseline: {:.p$} +/- {:.p$}",
            o.measured_baseline,
            o.measured_baseline_uncertainty,
            p = self.precision
        );
        let _ = writeln!(
            out,
            "Baseline magnitude: {:.p$} +/- {:.p$}",
            o.magnitude,
            o.magnitude_uncertainty,
            p = self.precision
        );

        for s in &report.samples {
            let n = s.index + 1;
            let _ = writeln!(out, "Uncertainty for p{} using dai: {}", n, self.vector(&s.uncertainty_via_a));
            let _ = writeln!(out, "Uncertainty for p{} using dbi: {}", n, self.vector(&s.uncertainty_via_b));
            if s.divergent {
                let _ = writeln!(
                    out,
                    "  p{} estimates diverge by {:.p$} (threshold {:.p$})",
                    n,
                    s.max_divergence,
                    report.divergence_threshold,
                    p = self.precision
                );
            }
        }
        for f in &report.failures {
            let _ = writeln!(out, "Sample p{} rejected: {}", f.index + 1, f.reason);
        }
        let _ = write!(
            out,
            "{} evaluated, {} failed",
            report.samples.len(),
            report.failures.len()
        );
        out
    }
}

/// JSON report
pub struct JsonFormatter {
    pub pretty: bool,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self { pretty: false }
    }
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn format_json(&self, report: &UncertaintyReport) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        }
    }
}

/// CSV report: one row per sample, rejected samples included with their reason
pub struct CsvFormatter {
    pub include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self { include_header: true }
    }
}

impl CsvFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self) -> String {
        "sample,status,ua_x,ua_y,ua_z,ub_x,ub_y,ub_z,max_divergence,reason".to_string()
    }

    pub fn format_csv(&self, report: &UncertaintyReport) -> String {
        let mut rows: Vec<(usize, String)> = Vec::with_capacity(report.samples.len() + report.failures.len());

        for s in &report.samples {
            let status = if s.divergent { "divergent" } else { "ok" };
            rows.push((
                s.index,
                format!(
                    "{},{},{},{},{},{},{},{},{},",
                    s.index + 1,
                    status,
                    s.uncertainty_via_a.x,
                    s.uncertainty_via_a.y,
                    s.uncertainty_via_a.z,
                    s.uncertainty_via_b.x,
                    s.uncertainty_via_b.y,
                    s.uncertainty_via_b.z,
                    s.max_divergence
                ),
            ));
        }
        for f in &report.failures {
            rows.push((
                f.index,
                format!("{},failed,,,,,,,,\"{}\"", f.index + 1, f.reason.replace('"', "\"\"")),
            ));
        }
        rows.sort_by_key(|(index, _)| *index);

        let mut lines = Vec::with_capacity(rows.len() + 1);
        if self.include_header {
            lines.push(self.header());
        }
        lines.extend(rows.into_iter().map(|(_, row)| row));
        lines.join("\n")
    }
}

/// Render a report in the requested format
pub fn render(report: &UncertaintyReport, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(TextFormatter::new().format_text(report)),
        OutputFormat::Json => JsonFormatter::pretty().format_json(report),
        OutputFormat::Csv => Ok(CsvFormatter::new().format_csv(report)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::baseline::{AnchorCalibration, Baseline};
    use crate::algorithms::evaluator::{EvaluatorOptions, PositionEvaluator, SampleMeasurement};
    use crate::core::UncertainScalar;

    fn report_with_failure() -> UncertaintyReport {
        let evaluator = PositionEvaluator::new(
            &Baseline::default(),
            &AnchorCalibration::default(),
            EvaluatorOptions::default(),
        )
        .unwrap();
        let m = |a: f64, b: f64| {
            SampleMeasurement::new(
                UncertainScalar::new(a, 5.0).unwrap(),
                UncertainScalar::new(b, 5.0).unwrap(),
            )
        };
        let evaluation = evaluator
            .evaluate(&[m(110.0, 380.0), m(-1.0, 491.0), m(390.0, 100.0)])
            .unwrap();
        UncertaintyReport::from(&evaluation)
    }

    #[test]
    fn test_report_from_evaluation() {
        let report = report_with_failure();
        assert_eq!(report.samples.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(report.failures[0].kind, "ZeroOrNegativeDistance");
        assert!(!report.samples[0].divergent);
    }

    #[test]
    fn test_orientation_keeps_measured_baseline_apart() {
        let o = report_with_failure().orientation;
        assert_eq!(o.measured_baseline, 490.0);
        assert_eq!(o.measured_baseline_uncertainty, 10.0);
        assert!((o.magnitude - 490.0).abs() < 1e-9);
        assert!((o.magnitude_uncertainty - 13.572).abs() < 1e-6);

        let text = TextFormatter::with_precision(3).format_text(&report_with_failure());
        assert!(text.contains("Measured baseline: 490.000 +/- 10.000"));
        assert!(text.contains("Baseline magnitude: 490.000 +/- 13.572"));
    }

    #[test]
    fn test_text_format() {
        let text = TextFormatter::with_precision(3).format_text(&report_with_failure());
        assert!(text.starts_with("Scanner rotation: [0.000, 0.000, 1.000]"));
        assert!(text.contains("Uncertainty for p1 using dai: [4.233, 3.848, 16.747]"));
        assert!(text.contains("Uncertainty for p3 using dbi:"));
        assert!(text.contains("Sample p2 rejected: distance to A must be strictly positive, got -1"));
        assert!(text.ends_with("2 evaluated, 1 failed"));
    }

    #[test]
    fn test_json_format_roundtrip() {
        let report = report_with_failure();
        let json = JsonFormatter::new().format_json(&report).unwrap();
        let parsed: UncertaintyReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.samples.len(), report.samples.len());
        assert_eq!(parsed.failures, report.failures);

        let pretty = render(&report, OutputFormat::Json).unwrap();
        assert!(pretty.contains('\n'));
    }

    #[test]
    fn test_csv_format_keeps_sample_order() {
        let csv = CsvFormatter::new().format_csv(&report_with_failure());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], CsvFormatter::new().header());
        assert!(lines[1].starts_with("1,ok,"));
        assert!(lines[2].starts_with("2,failed,"));
        assert!(lines[3].starts_with("3,ok,"));
        assert_eq!(lines[1].split(',').count(), 10);
    }
}
