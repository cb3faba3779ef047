//! Test outcome

use crate::effect::EffectSize;
use crate::kind::TestKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Degrees of freedom of the reference distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DegreesOfFreedom {
    /// t and chi-square tests
    Single(f64),
    /// F test: (between, within)
    Pair(f64, f64),
}

impl fmt::Display for DegreesOfFreedom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegreesOfFreedom::Single(df) => write!(f, "{df}"),
            DegreesOfFreedom::Pair(a, b) => write!(f, "({a}, {b})"),
        }
    }
}

/// What a test routine returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Test that produced this outcome
    pub kind: TestKind,
    /// Test statistic (t, F, χ², U, W or H)
    pub statistic: f64,
    /// `None` for the normal-approximated rank tests
    pub degrees_of_freedom: Option<DegreesOfFreedom>,
    /// Two-sided where applicable, always within [0, 1]
    pub p_value: f64,
    /// Standardised effect size
    pub effect_size: Option<EffectSize>,
    /// `Σ(t³ - t)` for rank tests
    pub tie_correction: Option<f64>,
}

/// Clamp rounding noise out of a probability
pub(crate) fn clamp_probability(p: f64) -> f64 {
    p.clamp(0.0, 1.0)
}
