//! Effect sizes
//!
//! Standardised magnitude of a result, reported next to the p-value. Each
//! measure has its own conventional bands. Effect sizes never feed into the
//! verdict.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which effect-size measure was computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectMeasure {
    /// Difference in means over the pooled standard deviation
    CohensD,
    /// Mean difference over the standard deviation of differences
    CohensDz,
    /// Share of total variance explained by group membership
    EtaSquared,
    /// Association strength for contingency tables
    CramersV,
    /// Rank-based r: |z| / sqrt(N) from the normal approximation.
    /// Not the rank-biserial correlation 1 - 2U / (n1 n2).
    RankR,
    /// H / (N - 1) for Kruskal-Wallis
    EpsilonSquared,
}

impl EffectMeasure {
    /// Lower bounds of the small, medium and large bands
    fn thresholds(self) -> [f64; 3] {
        match self {
            EffectMeasure::CohensD | EffectMeasure::CohensDz => [0.2, 0.5, 0.8],
            EffectMeasure::EtaSquared => [0.01, 0.06, 0.14],
            EffectMeasure::CramersV | EffectMeasure::RankR => [0.1, 0.3, 0.5],
            EffectMeasure::EpsilonSquared => [0.01, 0.08, 0.26],
        }
    }

    /// Conventional symbol
    pub fn symbol(self) -> &'static str {
        match self {
            EffectMeasure::CohensD => "d",
            EffectMeasure::CohensDz => "d_z",
            EffectMeasure::EtaSquared => "η²",
            EffectMeasure::CramersV => "V",
            EffectMeasure::RankR => "r",
            EffectMeasure::EpsilonSquared => "ε²",
        }
    }
}

/// Interpretation of effect size magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectMagnitude {
    /// Below the small band
    Negligible,
    /// Small effect
    Small,
    /// Medium effect
    Medium,
    /// Large effect
    Large,
}

impl fmt::Display for EffectMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectMagnitude::Negligible => write!(f, "negligible"),
            EffectMagnitude::Small => write!(f, "small"),
            EffectMagnitude::Medium => write!(f, "medium"),
            EffectMagnitude::Large => write!(f, "large"),
        }
    }
}

/// A computed effect size with its band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectSize {
    /// Measure used
    pub measure: EffectMeasure,
    /// Signed value (only Cohen's d and d_z can be negative)
    pub value: f64,
    /// Band of `|value|`
    pub magnitude: EffectMagnitude,
}

impl EffectSize {
    /// Classify `value` into the measure's bands
    pub fn new(measure: EffectMeasure, value: f64) -> Self {
        let [small, medium, large] = measure.thresholds();
        let abs = value.abs();
        let magnitude = if abs < small {
            EffectMagnitude::Negligible
        } else if abs < medium {
            EffectMagnitude::Small
        } else if abs < large {
            EffectMagnitude::Medium
        } else {
            EffectMagnitude::Large
        };
        Self {
            measure,
            value,
            magnitude,
        }
    }
}

impl fmt::Display for EffectSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {:.3} ({})",
            self.measure.symbol(),
            self.value,
            self.magnitude
        )
    }
}
