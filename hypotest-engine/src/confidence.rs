//! Confidence level and verdict
//!
//! The verdict rule lives here and nowhere else: a result is significant
//! iff `p_value < 1 - confidence_level` (strict). Every surface that shows a
//! verdict or an interpretation calls [`Verdict::decide`].

use crate::error::TestError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence level strictly between 0 and 1
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ConfidenceLevel(f64);

impl ConfidenceLevel {
    /// The customary 95% level
    pub const DEFAULT: ConfidenceLevel = ConfidenceLevel(0.95);

    /// Validate `0 < level < 1`
    ///
    /// A percentage such as `95.0` is rejected rather than rescaled.
    pub fn new(level: f64) -> Result<Self, TestError> {
        if level.is_finite() && level > 0.0 && level < 1.0 {
            Ok(Self(level))
        } else {
            Err(TestError::config(format!(
                "confidence level must be a fraction in (0, 1), got {level}"
            )))
        }
    }

    /// The raw fraction
    pub fn value(self) -> f64 {
        self.0
    }

    /// Significance threshold α = 1 - level
    pub fn alpha(self) -> f64 {
        1.0 - self.0
    }
}

impl Default for ConfidenceLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for ConfidenceLevel {
    type Error = TestError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConfidenceLevel> for f64 {
    fn from(level: ConfidenceLevel) -> Self {
        level.0
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0 * 100.0)
    }
}

/// Significance classification of a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    /// p-value below α: reject the null hypothesis
    Significant,
    /// p-value at or above α: fail to reject the null hypothesis
    NotSignificant,
}

impl Verdict {
    /// Apply the verdict rule
    ///
    /// # Examples
    ///
    /// ```
    /// # use hypotest_engine::{ConfidenceLevel, Verdict};
    /// let level = ConfidenceLevel::new(0.95).unwrap();
    /// assert_eq!(Verdict::decide(0.01, level), Verdict::Significant);
    /// assert_eq!(Verdict::decide(0.5, level), Verdict::NotSignificant);
    /// ```
    pub fn decide(p_value: f64, confidence: ConfidenceLevel) -> Self {
        if p_value < confidence.alpha() {
            Verdict::Significant
        } else {
            Verdict::NotSignificant
        }
    }

    /// Whether the null hypothesis is rejected
    pub fn is_significant(self) -> bool {
        matches!(self, Verdict::Significant)
    }

    /// Human-readable rendering used at the boundary
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Significant => "Statistically significant",
            Verdict::NotSignificant => "Not statistically significant",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_bounds() {
        assert!(ConfidenceLevel::new(0.95).is_ok());
        assert!(ConfidenceLevel::new(0.0).is_err());
        assert!(ConfidenceLevel::new(1.0).is_err());
        assert!(ConfidenceLevel::new(95.0).is_err());
        assert!(ConfidenceLevel::new(f64::NAN).is_err());
        assert!((ConfidenceLevel::new(0.99).unwrap().alpha() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_verdict_is_strict() {
        let level = ConfidenceLevel::new(0.5).unwrap();
        // alpha is exactly 0.5 here
        assert_eq!(Verdict::decide(0.5, level), Verdict::NotSignificant);
        assert_eq!(Verdict::decide(0.499_999, level), Verdict::Significant);
    }

    #[test]
    fn test_serde() {
        let level: ConfidenceLevel = serde_json::from_str("0.9").unwrap();
        assert_eq!(level.value(), 0.9);
        assert!(serde_json::from_str::<ConfidenceLevel>("1.5").is_err());
        assert_eq!(
            serde_json::to_string(&Verdict::NotSignificant).unwrap(),
            "\"not-significant\""
        );
    }
}
