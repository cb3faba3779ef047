#![warn(missing_docs)]
//! Hypotest Statistical Primitives
//!
//! Pure numeric building blocks used by the test engine:
//! - Descriptive statistics with floor-index (non-interpolated) quantiles
//! - Outlier fences via the IQR method
//! - Per-group summaries for reporting
//! - Joint rank transform with mid-rank tie correction
//! - Student's t, chi-square, F and standard normal distribution functions

mod descriptive;
mod distribution;
mod error;
mod outliers;
mod ranks;
mod special;
mod summary;

pub use descriptive::{Quartiles, max, mean, median, min, quartiles, std_dev, variance};
pub use distribution::{
    chi_square_cdf, chi_square_sf, f_cdf, f_sf, normal_cdf, normal_sf, student_t_cdf,
    student_t_sf,
};
pub use error::StatsError;
pub use outliers::{OutlierAnalysis, OutlierBounds, detect_outliers, outlier_bounds};
pub use ranks::{JointRanks, Ranking, rank, rank_joint};
pub use summary::{GroupSummary, compute_summary};

/// IQR multiplier used for outlier fences (Tukey's 1.5)
pub const IQR_FENCE_MULTIPLIER: f64 = 1.5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!((IQR_FENCE_MULTIPLIER - 1.5).abs() < f64::EPSILON);
    }
}
