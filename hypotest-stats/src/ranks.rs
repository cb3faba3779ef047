//! Rank Transform
//!
//! Assigns ranks `1..=n` to a sample (or the union of several samples) in
//! ascending order. A run of `t` tied values shares the average of the ranks
//! it occupies (mid-rank). The tie-correction term `Σ(t³ - t)` over all tie
//! groups is returned alongside, as the normal approximations of the rank
//! tests need it.

use crate::error::StatsError;

/// Ranks of a single sample, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// `ranks[i]` is the rank of the i-th input value
    pub ranks: Vec<f64>,
    /// `Σ(t³ - t)` over every group of `t` tied values
    pub tie_correction: f64,
    /// Sizes of the tie groups with more than one member
    pub tie_group_sizes: Vec<usize>,
}

impl Ranking {
    /// Whether any values were tied
    pub fn has_ties(&self) -> bool {
        !self.tie_group_sizes.is_empty()
    }
}

/// Ranks of several samples ranked jointly
#[derive(Debug, Clone, PartialEq)]
pub struct JointRanks {
    /// `ranks[g][i]` is the joint rank of value `i` of sample `g`
    pub ranks: Vec<Vec<f64>>,
    /// `Σ(t³ - t)` over every tie group of the pooled sample
    pub tie_correction: f64,
    /// Total number of pooled values
    pub total: usize,
}

impl JointRanks {
    /// Sum of ranks for each sample
    pub fn rank_sums(&self) -> Vec<f64> {
        self.ranks.iter().map(|r| r.iter().sum()).collect()
    }
}

/// Rank a single sample
///
/// # Examples
///
/// ```
/// # use hypotest_stats::rank;
/// let ranking = rank(&[10.0, 20.0, 20.0, 30.0]).unwrap();
/// assert_eq!(ranking.ranks, vec![1.0, 2.5, 2.5, 4.0]);
/// assert_eq!(ranking.tie_correction, 6.0);
/// ```
pub fn rank(values: &[f64]) -> Result<Ranking, StatsError> {
    if values.is_empty() {
        return Err(StatsError::EmptySample);
    }
    if values.iter().any(|v| v.is_nan()) {
        return Err(StatsError::invalid("rank", "sample contains NaN"));
    }

    let mut order: Vec<usize> = (0..values.len()).collect();
    // Stable sort keeps input order among ties
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut tie_correction = 0.0;
    let mut tie_group_sizes = Vec::new();

    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }

        // Positions start..end hold ranks start+1..=end
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = avg_rank;
        }

        let t = end - start;
        if t > 1 {
            let t = t as f64;
            tie_correction += t * t * t - t;
            tie_group_sizes.push(end - start);
        }
        start = end;
    }

    Ok(Ranking {
        ranks,
        tie_correction,
        tie_group_sizes,
    })
}

/// Rank the union of several samples jointly
pub fn rank_joint(samples: &[&[f64]]) -> Result<JointRanks, StatsError> {
    let pooled: Vec<f64> = samples.iter().flat_map(|s| s.iter().copied()).collect();
    let ranking = rank(&pooled)?;

    let mut ranks = Vec::with_capacity(samples.len());
    let mut offset = 0;
    for sample in samples {
        ranks.push(ranking.ranks[offset..offset + sample.len()].to_vec());
        offset += sample.len();
    }

    Ok(JointRanks {
        ranks,
        tie_correction: ranking.tie_correction,
        total: pooled.len(),
    })
}
