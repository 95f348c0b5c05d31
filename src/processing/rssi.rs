//! Summary statistics for a window of already-acquired RSSI readings

use serde::{Deserialize, Serialize};

use crate::validation::error::ProcessingError;

/// Sampling statistics over one acquisition window of RSSI readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssiSummary {
    pub count: usize,
    pub sample_rate_hz: f64,
    pub mean_dbm: f64,
    /// Largest difference between any two readings (dB)
    pub spread_db: f64,
}

/// Summarize readings (dBm) collected over `duration_s` seconds
pub fn summarize_window(readings_dbm: &[i32], duration_s: f64) -> Result<RssiSummary, ProcessingError> {
    if readings_dbm.is_empty() {
        return Err(ProcessingError::InsufficientRecords {
            available: 0,
            required: 1,
        });
    }
    if !(duration_s > 0.0) || !duration_s.is_finite() {
        return Err(ProcessingError::invalid(
            "window duration",
            format!("must be positive and finite, got {}", duration_s),
        ));
    }

    let count = readings_dbm.len();
    let total: i64 = readings_dbm.iter().map(|&r| r as i64).sum();
    let min = readings_dbm.iter().copied().min().unwrap_or_default();
    let max = readings_dbm.iter().copied().max().unwrap_or_default();

    Ok(RssiSummary {
        count,
        sample_rate_hz: count as f64 / duration_s,
        mean_dbm: total as f64 / count as f64,
        spread_db: (max as i64 - min as i64) as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_window_summary() {
        let summary = summarize_window(&[-60, -62, -58, -64, -61], 5.0).unwrap();
        assert_eq!(summary.count, 5);
        assert_relative_eq!(summary.sample_rate_hz, 1.0);
        assert_relative_eq!(summary.mean_dbm, -61.0);
        assert_relative_eq!(summary.spread_db, 6.0);
    }

    #[test]
    fn test_rejects_empty_and_bad_duration() {
        assert!(matches!(
            summarize_window(&[], 5.0),
            Err(ProcessingError::InsufficientRecords { .. })
        ));
        assert!(summarize_window(&[-50], 0.0).is_err());
        assert!(summarize_window(&[-50], f64::NAN).is_err());
    }

    #[test]
    fn test_extreme_readings_spread() {
        let summary = summarize_window(&[i32::MAX, i32::MIN], 1.0).unwrap();
        assert_relative_eq!(summary.spread_db, u32::MAX as f64);
        assert_relative_eq!(summary.mean_dbm, -0.5);
    }
}
