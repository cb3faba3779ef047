//! Chi-square test of independence
//!
//! Rows are groups (first-appearance order), columns are the distinct
//! values observed across all groups in ascending order. Cells count how
//! often each value occurs in each group.

use crate::effect::{EffectMeasure, EffectSize};
use crate::error::TestError;
use crate::kind::TestKind;
use crate::outcome::{DegreesOfFreedom, TestOutcome, clamp_probability};
use crate::sample::GroupedSample;
use hypotest_stats::chi_square_sf;

/// Observed counts, group x value
#[derive(Debug, Clone, PartialEq)]
pub struct ContingencyTable {
    /// Distinct values, ascending
    pub columns: Vec<f64>,
    /// `counts[row][col]`
    pub counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    /// Cross-tabulate a grouped sample
    pub fn from_sample(sample: &GroupedSample) -> Self {
        // `+ 0.0` folds -0.0 into 0.0 so both land in one column
        let mut columns: Vec<f64> = sample.pooled_values().iter().map(|v| v + 0.0).collect();
        columns.sort_by(f64::total_cmp);
        columns.dedup();

        let counts = sample
            .groups()
            .iter()
            .map(|group| {
                let mut row = vec![0u64; columns.len()];
                for value in &group.values {
                    let value = value + 0.0;
                    if let Ok(col) = columns.binary_search_by(|c| c.total_cmp(&value)) {
                        row[col] += 1;
                    }
                }
                row
            })
            .collect();

        Self { columns, counts }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.counts.len()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.columns.len()
    }

    /// Grand total of all cells
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    fn row_totals(&self) -> Vec<f64> {
        self.counts
            .iter()
            .map(|row| row.iter().sum::<u64>() as f64)
            .collect()
    }

    fn col_totals(&self) -> Vec<f64> {
        (0..self.cols())
            .map(|c| self.counts.iter().map(|row| row[c]).sum::<u64>() as f64)
            .collect()
    }
}

/// Chi-square test on the group x value table
///
/// With `yates` set and a 2x2 table (df = 1), every |observed - expected|
/// is reduced by 0.5, floored at 0.
pub fn chi_square_test(sample: &GroupedSample, yates: bool) -> Result<TestOutcome, TestError> {
    let table = ContingencyTable::from_sample(sample);
    if table.rows() < 2 {
        return Err(TestError::config(format!(
            "chi-square test requires at least 2 groups, found {}",
            table.rows()
        )));
    }
    if table.cols() < 2 {
        return Err(TestError::config(
            "chi-square test requires at least 2 distinct values",
        ));
    }

    let rows = table.row_totals();
    let cols = table.col_totals();
    let n = table.total() as f64;
    let df = ((table.rows() - 1) * (table.cols() - 1)) as f64;
    let corrected = yates && table.rows() == 2 && table.cols() == 2;

    let mut statistic = 0.0;
    for (r, row) in table.counts.iter().enumerate() {
        for (c, &observed) in row.iter().enumerate() {
            let expected = rows[r] * cols[c] / n;
            let mut deviation = (observed as f64 - expected).abs();
            if corrected {
                deviation = (deviation - 0.5).max(0.0);
            }
            statistic += deviation * deviation / expected;
        }
    }

    let p = chi_square_sf(statistic, df)?;
    let min_dim = table.rows().min(table.cols()) as f64;
    let cramers_v = (statistic / (n * (min_dim - 1.0))).sqrt();

    Ok(TestOutcome {
        kind: TestKind::ChiSquare,
        statistic,
        degrees_of_freedom: Some(DegreesOfFreedom::Single(df)),
        p_value: clamp_probability(p),
        effect_size: Some(EffectSize::new(EffectMeasure::CramersV, cramers_v)),
        tie_correction: None,
    })
}
