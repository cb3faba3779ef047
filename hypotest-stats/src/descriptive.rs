//! Descriptive Statistics
//!
//! Central tendency and dispersion for a single sample.
//!
//! Quantiles use the floor-index convention on the ascending-sorted sample
//! (no interpolation): `Q1 = x[floor(0.25n)]`, `Q3 = x[floor(0.75n)]`.
//! The median is the middle element for odd `n` and the lower-middle element
//! `x[(n - 1) / 2]` for even `n`. Variance is the population variance
//! (divide by `n`).

use crate::error::StatsError;
use serde::{Deserialize, Serialize};

/// Quartiles computed with the floor-index convention
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    /// First quartile
    pub q1: f64,
    /// Median (lower-middle for even counts)
    pub median: f64,
    /// Third quartile
    pub q3: f64,
}

impl Quartiles {
    /// Interquartile range (Q3 - Q1)
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

pub(crate) fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Element at `floor(fraction * n)` of an already sorted, non-empty sample
pub(crate) fn floor_index(sorted: &[f64], fraction: f64) -> f64 {
    let n = sorted.len();
    let idx = ((fraction * n as f64).floor() as usize).min(n - 1);
    sorted[idx]
}

pub(crate) fn median_of_sorted(sorted: &[f64]) -> f64 {
    sorted[(sorted.len() - 1) / 2]
}

fn ensure_non_empty(values: &[f64]) -> Result<(), StatsError> {
    if values.is_empty() {
        Err(StatsError::EmptySample)
    } else {
        Ok(())
    }
}

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Result<f64, StatsError> {
    ensure_non_empty(values)?;
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median (lower-middle element for even counts)
///
/// # Examples
///
/// ```
/// # use hypotest_stats::median;
/// assert_eq!(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0);
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.0);
/// ```
pub fn median(values: &[f64]) -> Result<f64, StatsError> {
    ensure_non_empty(values)?;
    Ok(median_of_sorted(&sorted(values)))
}

/// Population variance (sum of squared deviations divided by `n`)
pub fn variance(values: &[f64]) -> Result<f64, StatsError> {
    let m = mean(values)?;
    // Rounding in the mean must not leak a spread into a constant sample
    if values.iter().all(|&v| v == values[0]) {
        return Ok(0.0);
    }
    Ok(values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64)
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> Result<f64, StatsError> {
    variance(values).map(f64::sqrt)
}

/// Smallest value
pub fn min(values: &[f64]) -> Result<f64, StatsError> {
    ensure_non_empty(values)?;
    Ok(values.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Largest value
pub fn max(values: &[f64]) -> Result<f64, StatsError> {
    ensure_non_empty(values)?;
    Ok(values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

/// Q1, median and Q3 using the floor-index convention
pub fn quartiles(values: &[f64]) -> Result<Quartiles, StatsError> {
    ensure_non_empty(values)?;
    let sorted = sorted(values);
    Ok(Quartiles {
        q1: floor_index(&sorted, 0.25),
        median: median_of_sorted(&sorted),
        q3: floor_index(&sorted, 0.75),
    })
}
