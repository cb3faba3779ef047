//! Outlier Detection
//!
//! Uses the IQR (Interquartile Range) method with Tukey's 1.5 fences.
//!
//! Outliers are reported, never removed: trimmed min/max are the extreme
//! non-outlier values, falling back to the raw min/max when every value
//! lies outside the fences.

use crate::IQR_FENCE_MULTIPLIER;
use crate::descriptive::{floor_index, sorted};
use crate::error::StatsError;
use serde::{Deserialize, Serialize};

/// Lower and upper fences for outlier detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    /// Values below this are low outliers
    pub lower: f64,
    /// Values above this are high outliers
    pub upper: f64,
}

impl OutlierBounds {
    /// Whether `value` lies outside the fences
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Fences `Q1 - 1.5 IQR` and `Q3 + 1.5 IQR`
pub fn outlier_bounds(q1: f64, q3: f64) -> OutlierBounds {
    let iqr = q3 - q1;
    OutlierBounds {
        lower: q1 - IQR_FENCE_MULTIPLIER * iqr,
        upper: q3 + IQR_FENCE_MULTIPLIER * iqr,
    }
}

/// Result of outlier analysis
#[derive(Debug, Clone)]
pub struct OutlierAnalysis {
    /// Fences used for detection
    pub bounds: OutlierBounds,
    /// Indices (into the input) of outlier values
    pub outlier_indices: Vec<usize>,
    /// Number of low outliers (below lower fence)
    pub low_outlier_count: usize,
    /// Number of high outliers (above upper fence)
    pub high_outlier_count: usize,
    /// Smallest non-outlier value
    pub trimmed_min: f64,
    /// Largest non-outlier value
    pub trimmed_max: f64,
}

impl OutlierAnalysis {
    /// Total number of outliers
    pub fn outlier_count(&self) -> usize {
        self.outlier_indices.len()
    }
}

/// Detect outliers using floor-index quartiles
///
/// # Examples
///
/// ```
/// # use hypotest_stats::detect_outliers;
/// let analysis = detect_outliers(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
/// assert_eq!(analysis.high_outlier_count, 1);
/// assert_eq!(analysis.trimmed_max, 5.0);
/// ```
pub fn detect_outliers(values: &[f64]) -> Result<OutlierAnalysis, StatsError> {
    if values.is_empty() {
        return Err(StatsError::EmptySample);
    }

    let sorted = sorted(values);
    let bounds = outlier_bounds(floor_index(&sorted, 0.25), floor_index(&sorted, 0.75));

    let mut outlier_indices = Vec::new();
    let mut low_count = 0;
    let mut high_count = 0;
    let mut trimmed_min = f64::INFINITY;
    let mut trimmed_max = f64::NEG_INFINITY;

    for (i, &value) in values.iter().enumerate() {
        if value < bounds.lower {
            outlier_indices.push(i);
            low_count += 1;
        } else if value > bounds.upper {
            outlier_indices.push(i);
            high_count += 1;
        } else {
            trimmed_min = trimmed_min.min(value);
            trimmed_max = trimmed_max.max(value);
        }
    }

    if outlier_indices.len() == values.len() {
        trimmed_min = sorted[0];
        trimmed_max = sorted[sorted.len() - 1];
    }

    Ok(OutlierAnalysis {
        bounds,
        outlier_indices,
        low_outlier_count: low_count,
        high_outlier_count: high_count,
        trimmed_min,
        trimmed_max,
    })
}
