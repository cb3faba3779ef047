//! Summary Statistics
//!
//! Per-group descriptive summary attached to every analysis result.
//! All figures use the same conventions as [`crate::quartiles`] and
//! [`crate::std_dev`] so that a group summary and the overall figures of
//! an analysis are directly comparable.

use crate::descriptive::{floor_index, median_of_sorted, sorted};
use crate::error::StatsError;
use crate::outliers::detect_outliers;
use serde::{Deserialize, Serialize};

/// Descriptive summary of one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Number of values
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Median (lower-middle for even counts)
    pub median: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// First quartile (floor index)
    pub q1: f64,
    /// Third quartile (floor index)
    pub q3: f64,
    /// Lower outlier fence
    pub lower_fence: f64,
    /// Upper outlier fence
    pub upper_fence: f64,
    /// Values outside the fences
    pub outlier_count: usize,
    /// Smallest non-outlier value
    pub trimmed_min: f64,
    /// Largest non-outlier value
    pub trimmed_max: f64,
}

impl GroupSummary {
    /// Coefficient of variation in percent (0 when the mean is 0)
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            (self.std_dev / self.mean.abs()) * 100.0
        }
    }
}

/// Compute the summary of a non-empty sample
pub fn compute_summary(values: &[f64]) -> Result<GroupSummary, StatsError> {
    if values.is_empty() {
        return Err(StatsError::EmptySample);
    }

    let sorted = sorted(values);
    let outliers = detect_outliers(values)?;

    Ok(GroupSummary {
        count: values.len(),
        mean: crate::mean(values)?,
        median: median_of_sorted(&sorted),
        std_dev: crate::std_dev(values)?,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        q1: floor_index(&sorted, 0.25),
        q3: floor_index(&sorted, 0.75),
        lower_fence: outliers.bounds.lower,
        upper_fence: outliers.bounds.upper,
        outlier_count: outliers.outlier_count(),
        trimmed_min: outliers.trimmed_min,
        trimmed_max: outliers.trimmed_max,
    })
}
