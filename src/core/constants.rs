//! Reference scanner constants (millimetres unless noted)

/// Nominal distance between anchor modules A and B
pub const REFERENCE_BASELINE_MM: f64 = 490.0;

/// Measurement uncertainty of the baseline
pub const REFERENCE_BASELINE_UNCERTAINTY_MM: f64 = 10.0;

/// Default uncertainty of every sample-to-anchor distance
pub const DEFAULT_DISTANCE_UNCERTAINTY_MM: f64 = 5.0;

/// Raw orientation reading of the reference scanner, almost pure +z
pub const REFERENCE_DIRECTION: [f64; 3] = [0.0001, 0.0001, 10000.0001];

/// Calibrated per-axis position uncertainty of anchor A
pub const ANCHOR_A_UNCERTAINTY_MM: [f64; 3] = [2.787, 2.603, 5.653];

/// Calibrated per-axis position uncertainty of anchor B
pub const ANCHOR_B_UNCERTAINTY_MM: [f64; 3] = [3.653, 2.944, 7.919];

/// Sample distances to anchor A along the reference scan path
pub const REFERENCE_SAMPLE_DISTANCES_MM: [f64; 5] = [110.0, 185.0, 255.0, 325.0, 390.0];

/// Exponent used to take the magnitude of a sum of squares
pub const ROOT_EXPONENT: f64 = 0.5;

/// Default per-axis A/B disagreement above which a sample is flagged
pub const DEFAULT_DIVERGENCE_THRESHOLD_MM: f64 = 25.0;

/// Frame-to-frame movements at or above this are tracker glitches
pub const MAX_DELTA_MM: f64 = 150.0;
