//! Parametric tests
//!
//! Student's t-tests and one-way ANOVA. These use the unbiased (n - 1)
//! variance estimators; the population convention of the descriptive
//! summaries does not apply here.

use crate::effect::{EffectMeasure, EffectSize};
use crate::error::TestError;
use crate::kind::TestKind;
use crate::outcome::{DegreesOfFreedom, TestOutcome, clamp_probability};
use crate::sample::GroupedSample;
use hypotest_stats::{f_sf, mean, student_t_sf};

/// Σ(x - mean)²
fn sum_of_squares(values: &[f64], center: f64) -> f64 {
    values.iter().map(|x| (x - center).powi(2)).sum()
}

pub(crate) fn require_group_count(
    sample: &GroupedSample,
    expected: usize,
    test: &str,
) -> Result<(), TestError> {
    if sample.group_count() != expected {
        return Err(TestError::config(format!(
            "{test} requires exactly {expected} groups, found {}",
            sample.group_count()
        )));
    }
    Ok(())
}

pub(crate) fn require_min_size(
    sample: &GroupedSample,
    min: usize,
    test: &str,
) -> Result<(), TestError> {
    if let Some(group) = sample.groups().iter().find(|g| g.values.len() < min) {
        return Err(TestError::config(format!(
            "{test} requires at least {min} values per group, group '{}' has {}",
            group.label,
            group.values.len()
        )));
    }
    Ok(())
}

pub(crate) fn require_equal_lengths(sample: &GroupedSample, test: &str) -> Result<(), TestError> {
    let (a, b) = (sample.group(0), sample.group(1));
    if a.values.len() != b.values.len() {
        return Err(TestError::config(format!(
            "{test} requires groups of equal length, '{}' has {} and '{}' has {}",
            a.label,
            a.values.len(),
            b.label,
            b.values.len()
        )));
    }
    Ok(())
}

/// Two-sample t-test with pooled variance, df = n1 + n2 - 2
pub fn independent_t_test(sample: &GroupedSample) -> Result<TestOutcome, TestError> {
    require_group_count(sample, 2, "independent t-test")?;
    require_min_size(sample, 2, "independent t-test")?;

    let a = &sample.group(0).values;
    let b = &sample.group(1).values;
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let (m1, m2) = (mean(a)?, mean(b)?);

    let df = n1 + n2 - 2.0;
    let pooled_var = (sum_of_squares(a, m1) + sum_of_squares(b, m2)) / df;
    let se = (pooled_var * (1.0 / n1 + 1.0 / n2)).sqrt();
    if se == 0.0 || !se.is_finite() {
        return Err(TestError::parameter(
            "independent t-test: both groups have zero variance",
        ));
    }

    let t = (m1 - m2) / se;
    let p = 2.0 * student_t_sf(t.abs(), df)?;

    Ok(TestOutcome {
        kind: TestKind::TTestIndependent,
        statistic: t,
        degrees_of_freedom: Some(DegreesOfFreedom::Single(df)),
        p_value: clamp_probability(p),
        effect_size: Some(EffectSize::new(
            EffectMeasure::CohensD,
            (m1 - m2) / pooled_var.sqrt(),
        )),
        tie_correction: None,
    })
}

/// t-test on per-row differences `first - second`, df = n - 1
pub fn paired_t_test(sample: &GroupedSample) -> Result<TestOutcome, TestError> {
    require_group_count(sample, 2, "paired t-test")?;
    require_equal_lengths(sample, "paired t-test")?;
    require_min_size(sample, 2, "paired t-test")?;

    let diffs: Vec<f64> = sample
        .group(0)
        .values
        .iter()
        .zip(&sample.group(1).values)
        .map(|(a, b)| a - b)
        .collect();
    let n = diffs.len() as f64;
    let mean_diff = mean(&diffs)?;
    let sd = (sum_of_squares(&diffs, mean_diff) / (n - 1.0)).sqrt();
    if sd == 0.0 {
        return Err(TestError::parameter(
            "paired t-test: differences have zero variance",
        ));
    }

    let df = n - 1.0;
    let t = mean_diff / (sd / n.sqrt());
    let p = 2.0 * student_t_sf(t.abs(), df)?;

    Ok(TestOutcome {
        kind: TestKind::TTestPaired,
        statistic: t,
        degrees_of_freedom: Some(DegreesOfFreedom::Single(df)),
        p_value: clamp_probability(p),
        effect_size: Some(EffectSize::new(EffectMeasure::CohensDz, mean_diff / sd)),
        tie_correction: None,
    })
}

/// One-way ANOVA, F = MS_between / MS_within
pub fn one_way_anova(sample: &GroupedSample) -> Result<TestOutcome, TestError> {
    if sample.group_count() < 2 {
        return Err(TestError::config(format!(
            "ANOVA requires at least 2 groups, found {}",
            sample.group_count()
        )));
    }
    require_min_size(sample, 2, "ANOVA")?;

    let pooled = sample.pooled_values();
    let grand_mean = mean(&pooled)?;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for group in sample.groups() {
        let m = mean(&group.values)?;
        ss_between += group.values.len() as f64 * (m - grand_mean).powi(2);
        ss_within += sum_of_squares(&group.values, m);
    }

    let df_between = (sample.group_count() - 1) as f64;
    let df_within = (pooled.len() - sample.group_count()) as f64;
    if ss_within == 0.0 {
        return Err(TestError::parameter(
            "ANOVA: within-group variance is zero",
        ));
    }

    let f = (ss_between / df_between) / (ss_within / df_within);
    let p = f_sf(f, df_between, df_within)?;

    Ok(TestOutcome {
        kind: TestKind::Anova,
        statistic: f,
        degrees_of_freedom: Some(DegreesOfFreedom::Pair(df_between, df_within)),
        p_value: clamp_probability(p),
        effect_size: Some(EffectSize::new(
            EffectMeasure::EtaSquared,
            ss_between / (ss_between + ss_within),
        )),
        tie_correction: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::EffectMagnitude;

    fn two_groups(a: &[f64], b: &[f64]) -> GroupedSample {
        let pairs = a
            .iter()
            .map(|&v| ("A", v))
            .chain(b.iter().map(|&v| ("B", v)));
        GroupedSample::from_pairs(pairs).unwrap()
    }

    #[test]
    fn test_independent_separated_groups() {
        let sample = two_groups(&[1.0, 2.0, 3.0, 4.0, 5.0], &[6.0, 7.0, 8.0, 9.0, 10.0]);
        let outcome = independent_t_test(&sample).unwrap();

        assert!((outcome.statistic + 5.0).abs() < 1e-12);
        assert_eq!(outcome.degrees_of_freedom, Some(DegreesOfFreedom::Single(8.0)));
        assert!((outcome.p_value - 0.001_052_825_793_366_539).abs() < 1e-9);

        let effect = outcome.effect_size.unwrap();
        assert!((effect.value + 3.162_277_660_168_38).abs() < 1e-9);
        assert_eq!(effect.magnitude, EffectMagnitude::Large);
    }

    #[test]
    fn test_independent_identical_groups() {
        let sample = two_groups(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        let outcome = independent_t_test(&sample).unwrap();

        assert_eq!(outcome.statistic, 0.0);
        assert!((outcome.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_independent_preconditions() {
        let small = two_groups(&[1.0], &[2.0, 3.0]);
        assert!(matches!(
            independent_t_test(&small),
            Err(TestError::InvalidConfiguration(_))
        ));

        let three = GroupedSample::from_pairs([("a", 1.0), ("b", 2.0), ("c", 3.0)]).unwrap();
        assert!(matches!(
            independent_t_test(&three),
            Err(TestError::InvalidConfiguration(_))
        ));

        let constant = two_groups(&[4.0, 4.0], &[4.0, 4.0, 4.0]);
        assert!(matches!(
            independent_t_test(&constant),
            Err(TestError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_paired_matches_closed_form() {
        // differences [1, 2, 3]: t = 2 * sqrt(3), df = 2
        let sample = two_groups(&[5.0, 7.0, 9.0], &[4.0, 5.0, 6.0]);
        let outcome = paired_t_test(&sample).unwrap();

        let t = 2.0 * 3.0_f64.sqrt();
        assert!((outcome.statistic - t).abs() < 1e-12);
        assert_eq!(outcome.degrees_of_freedom, Some(DegreesOfFreedom::Single(2.0)));
        let expected_p = 1.0 - t / (t * t + 2.0).sqrt();
        assert!((outcome.p_value - expected_p).abs() < 1e-10);
        assert!((outcome.p_value - 0.074_179_9).abs() < 1e-6);
        assert!((outcome.effect_size.unwrap().value - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_paired_preconditions() {
        let unequal = two_groups(&[1.0, 2.0, 3.0], &[1.0, 2.0]);
        let err = paired_t_test(&unequal).unwrap_err();
        assert!(matches!(err, TestError::InvalidConfiguration(ref m) if m.contains("equal length")));

        let shifted = two_groups(&[2.0, 3.0, 4.0], &[1.0, 2.0, 3.0]);
        assert!(matches!(
            paired_t_test(&shifted),
            Err(TestError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_anova_closed_form() {
        let sample = GroupedSample::from_pairs(
            [
                ("a", 1.0),
                ("a", 2.0),
                ("a", 3.0),
                ("b", 4.0),
                ("b", 5.0),
                ("b", 6.0),
                ("c", 7.0),
                ("c", 8.0),
                ("c", 9.0),
            ]
            .into_iter(),
        )
        .unwrap();
        let outcome = one_way_anova(&sample).unwrap();

        assert!((outcome.statistic - 27.0).abs() < 1e-10);
        assert_eq!(
            outcome.degrees_of_freedom,
            Some(DegreesOfFreedom::Pair(2.0, 6.0))
        );
        // df1 = 2: P(F > f) = (1 + 2f/df2)^(-df2/2) = 10^-3
        assert!((outcome.p_value - 0.001).abs() < 1e-10);
        assert!((outcome.effect_size.unwrap().value - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_anova_zero_within_variance() {
        let sample =
            GroupedSample::from_pairs([("a", 1.0), ("a", 1.0), ("b", 2.0), ("b", 2.0)]).unwrap();
        assert!(matches!(
            one_way_anova(&sample),
            Err(TestError::InvalidParameter(_))
        ));
    }
}
