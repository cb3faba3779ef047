//! Rank-based tests
//!
//! Mann-Whitney U, Wilcoxon signed-rank and Kruskal-Wallis H. The two-group
//! tests use the large-sample normal approximation with tie correction and
//! a 0.5 continuity correction; no exact distributions are computed.

use crate::effect::{EffectMeasure, EffectSize};
use crate::error::TestError;
use crate::kind::TestKind;
use crate::outcome::{DegreesOfFreedom, TestOutcome, clamp_probability};
use crate::parametric::{require_equal_lengths, require_group_count};
use crate::sample::GroupedSample;
use hypotest_stats::{chi_square_sf, normal_sf, rank, rank_joint};

/// Continuity-corrected |z| for a statistic with the given mean and variance
fn corrected_z(statistic: f64, mean: f64, variance: f64) -> f64 {
    ((statistic - mean).abs() - 0.5).max(0.0) / variance.sqrt()
}

/// Mann-Whitney U test; the statistic is U of the first group
pub fn mann_whitney(sample: &GroupedSample) -> Result<TestOutcome, TestError> {
    require_group_count(sample, 2, "Mann-Whitney test")?;

    let a = &sample.group(0).values;
    let b = &sample.group(1).values;
    let joint = rank_joint(&[a.as_slice(), b.as_slice()])?;

    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let n = n1 + n2;
    let rank_sum_a: f64 = joint.ranks[0].iter().sum();
    let u = rank_sum_a - n1 * (n1 + 1.0) / 2.0;

    let mean_u = n1 * n2 / 2.0;
    let variance = n1 * n2 / 12.0 * ((n + 1.0) - joint.tie_correction / (n * (n - 1.0)));
    if variance <= 0.0 || !variance.is_finite() {
        return Err(TestError::parameter(
            "Mann-Whitney test: all values are tied, rank variance is zero",
        ));
    }

    let z = corrected_z(u, mean_u, variance);
    let p = 2.0 * normal_sf(z);

    Ok(TestOutcome {
        kind: TestKind::MannWhitney,
        statistic: u,
        degrees_of_freedom: None,
        p_value: clamp_probability(p),
        effect_size: Some(EffectSize::new(EffectMeasure::RankR, z / n.sqrt())),
        tie_correction: Some(joint.tie_correction),
    })
}

/// Wilcoxon signed-rank test on `first - second`, zero differences dropped
///
/// The statistic is `min(W+, W-)`.
pub fn wilcoxon(sample: &GroupedSample) -> Result<TestOutcome, TestError> {
    require_group_count(sample, 2, "Wilcoxon test")?;
    require_equal_lengths(sample, "Wilcoxon test")?;

    let diffs: Vec<f64> = sample
        .group(0)
        .values
        .iter()
        .zip(&sample.group(1).values)
        .map(|(a, b)| a - b)
        .filter(|d| *d != 0.0)
        .collect();
    if diffs.is_empty() {
        return Err(TestError::parameter(
            "Wilcoxon test: every paired difference is zero",
        ));
    }

    let magnitudes: Vec<f64> = diffs.iter().map(|d| d.abs()).collect();
    let ranking = rank(&magnitudes)?;

    let (mut w_plus, mut w_minus) = (0.0, 0.0);
    for (d, r) in diffs.iter().zip(&ranking.ranks) {
        if *d > 0.0 {
            w_plus += r;
        } else {
            w_minus += r;
        }
    }

    let n = diffs.len() as f64;
    let mean_w = n * (n + 1.0) / 4.0;
    let variance = n * (n + 1.0) * (2.0 * n + 1.0) / 24.0 - ranking.tie_correction / 48.0;
    if variance <= 0.0 {
        return Err(TestError::parameter(
            "Wilcoxon test: signed-rank variance is zero",
        ));
    }

    let z = corrected_z(w_plus, mean_w, variance);
    let p = 2.0 * normal_sf(z);

    Ok(TestOutcome {
        kind: TestKind::Wilcoxon,
        statistic: w_plus.min(w_minus),
        degrees_of_freedom: None,
        p_value: clamp_probability(p),
        effect_size: Some(EffectSize::new(EffectMeasure::RankR, z / n.sqrt())),
        tie_correction: Some(ranking.tie_correction),
    })
}

/// Kruskal-Wallis H test, divided by `1 - Σ(t³ - t) / (N³ - N)`
pub fn kruskal_wallis(sample: &GroupedSample) -> Result<TestOutcome, TestError> {
    let k = sample.group_count();
    if k < 2 {
        return Err(TestError::config(format!(
            "Kruskal-Wallis test requires at least 2 groups, found {k}"
        )));
    }

    let joint = rank_joint(&sample.value_slices())?;
    let n = joint.total as f64;

    let weighted: f64 = joint
        .ranks
        .iter()
        .map(|r| {
            let sum: f64 = r.iter().sum();
            sum * sum / r.len() as f64
        })
        .sum();
    let h_raw = 12.0 / (n * (n + 1.0)) * weighted - 3.0 * (n + 1.0);

    let correction = 1.0 - joint.tie_correction / (n * n * n - n);
    if correction <= 0.0 {
        return Err(TestError::parameter(
            "Kruskal-Wallis test: all values are tied",
        ));
    }
    // Rounding can push a zero H slightly negative
    let h = (h_raw / correction).max(0.0);
    let df = (k - 1) as f64;
    let p = chi_square_sf(h, df)?;

    Ok(TestOutcome {
        kind: TestKind::KruskalWallis,
        statistic: h,
        degrees_of_freedom: Some(DegreesOfFreedom::Single(df)),
        p_value: clamp_probability(p),
        effect_size: Some(EffectSize::new(EffectMeasure::EpsilonSquared, h / (n - 1.0))),
        tie_correction: Some(joint.tie_correction),
    })
}
