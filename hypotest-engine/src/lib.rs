#![warn(missing_docs)]
//! Hypotest Test Engine
//!
//! One routine per supported hypothesis test, selected from the closed
//! [`TestKind`] set by exhaustive matching:
//! - Independent (pooled) and paired t-tests
//! - One-way ANOVA
//! - Chi-square test of independence
//! - Mann-Whitney U, Wilcoxon signed-rank and Kruskal-Wallis H
//!
//! Routines are pure and synchronous. They return a [`TestOutcome`]; the
//! verdict is applied on top through [`Verdict::decide`].

mod confidence;
mod contingency;
mod effect;
mod error;
mod kind;
mod nonparametric;
mod outcome;
mod parametric;
mod sample;

pub use confidence::{ConfidenceLevel, Verdict};
pub use contingency::{ContingencyTable, chi_square_test};
pub use effect::{EffectMagnitude, EffectMeasure, EffectSize};
pub use error::TestError;
pub use kind::TestKind;
pub use nonparametric::{kruskal_wallis, mann_whitney, wilcoxon};
pub use outcome::{DegreesOfFreedom, TestOutcome};
pub use parametric::{independent_t_test, one_way_anova, paired_t_test};
pub use sample::{Group, GroupedSample};

use serde::{Deserialize, Serialize};

/// Which test to run and at what confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestConfiguration {
    /// Test to run
    #[serde(rename = "test_type")]
    pub kind: TestKind,
    /// Confidence level; α = 1 - level
    #[serde(rename = "confidence_level")]
    pub confidence: ConfidenceLevel,
}

impl TestConfiguration {
    /// Bundle a test kind with a confidence level
    pub fn new(kind: TestKind, confidence: ConfidenceLevel) -> Self {
        Self { kind, confidence }
    }

    /// Verdict for a p-value under this configuration
    pub fn verdict(&self, p_value: f64) -> Verdict {
        Verdict::decide(p_value, self.confidence)
    }
}

/// Knobs that change how a test is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Apply Yates' continuity correction to 2x2 chi-square tables
    pub yates_correction: bool,
}

/// Run the test selected by `kind` on `sample`
///
/// # Examples
///
/// ```
/// # use hypotest_engine::{EngineOptions, GroupedSample, TestKind, run_test};
/// let sample = GroupedSample::from_pairs([
///     ("A", 1.0), ("A", 2.0), ("A", 3.0),
///     ("B", 1.0), ("B", 2.0), ("B", 3.0),
/// ]).unwrap();
/// let outcome = run_test(TestKind::TTestIndependent, &sample, &EngineOptions::default()).unwrap();
/// assert_eq!(outcome.statistic, 0.0);
/// ```
pub fn run_test(
    kind: TestKind,
    sample: &GroupedSample,
    options: &EngineOptions,
) -> Result<TestOutcome, TestError> {
    match kind {
        TestKind::TTestIndependent => independent_t_test(sample),
        TestKind::TTestPaired => paired_t_test(sample),
        TestKind::Anova => one_way_anova(sample),
        TestKind::ChiSquare => chi_square_test(sample, options.yates_correction),
        TestKind::MannWhitney => mann_whitney(sample),
        TestKind::Wilcoxon => wilcoxon(sample),
        TestKind::KruskalWallis => kruskal_wallis(sample),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GroupedSample {
        GroupedSample::from_pairs([
            ("A", 1.0),
            ("A", 2.0),
            ("A", 3.0),
            ("A", 4.0),
            ("B", 2.0),
            ("B", 4.0),
            ("B", 5.0),
            ("B", 7.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_dispatch_reports_kind() {
        let options = EngineOptions::default();
        for kind in TestKind::ALL {
            let outcome = run_test(kind, &sample(), &options).unwrap();
            assert_eq!(outcome.kind, kind);
            assert!((0.0..=1.0).contains(&outcome.p_value), "{kind}: {}", outcome.p_value);
        }
    }

    #[test]
    fn test_deterministic() {
        let options = EngineOptions::default();
        for kind in TestKind::ALL {
            let first = run_test(kind, &sample(), &options).unwrap();
            let second = run_test(kind, &sample(), &options).unwrap();
            assert_eq!(first.statistic.to_bits(), second.statistic.to_bits());
            assert_eq!(first.p_value.to_bits(), second.p_value.to_bits());
        }
    }

    #[test]
    fn test_configuration_verdict() {
        let config = TestConfiguration::new(TestKind::Anova, ConfidenceLevel::new(0.99).unwrap());
        assert!(config.verdict(0.005).is_significant());
        assert!(!config.verdict(0.02).is_significant());
    }
}
