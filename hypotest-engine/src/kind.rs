//! Supported tests
//!
//! `TestKind` is a closed set; every routine is selected by exhaustive
//! matching. Names from the outside world are resolved through an exact
//! alias table, never by substring matching.

use crate::error::TestError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The seven supported hypothesis tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum TestKind {
    /// Two-sample Student's t-test with pooled variance
    TTestIndependent,
    /// Paired-sample t-test on per-row differences
    TTestPaired,
    /// One-way analysis of variance (F-test)
    Anova,
    /// Chi-square test of independence on a group x value contingency table
    ChiSquare,
    /// Mann-Whitney U rank-sum test
    MannWhitney,
    /// Wilcoxon signed-rank test
    Wilcoxon,
    /// Kruskal-Wallis H test
    KruskalWallis,
}

/// Accepted names, exact and case-sensitive
const ALIASES: &[(&str, TestKind)] = &[
    ("t-test-independent", TestKind::TTestIndependent),
    ("t-test", TestKind::TTestIndependent),
    ("t-test-paired", TestKind::TTestPaired),
    ("paired-t-test", TestKind::TTestPaired),
    ("anova", TestKind::Anova),
    ("ANOVA", TestKind::Anova),
    ("chi-square", TestKind::ChiSquare),
    ("mann-whitney", TestKind::MannWhitney),
    ("Mann-Whitney U", TestKind::MannWhitney),
    ("wilcoxon", TestKind::Wilcoxon),
    ("Wilcoxon", TestKind::Wilcoxon),
    ("kruskal-wallis", TestKind::KruskalWallis),
    ("Kruskal-Wallis", TestKind::KruskalWallis),
];

impl TestKind {
    /// Every supported test, in catalogue order
    pub const ALL: [TestKind; 7] = [
        TestKind::TTestIndependent,
        TestKind::TTestPaired,
        TestKind::Anova,
        TestKind::ChiSquare,
        TestKind::MannWhitney,
        TestKind::Wilcoxon,
        TestKind::KruskalWallis,
    ];

    /// Canonical wire name
    pub fn name(self) -> &'static str {
        match self {
            TestKind::TTestIndependent => "t-test-independent",
            TestKind::TTestPaired => "t-test-paired",
            TestKind::Anova => "anova",
            TestKind::ChiSquare => "chi-square",
            TestKind::MannWhitney => "mann-whitney",
            TestKind::Wilcoxon => "wilcoxon",
            TestKind::KruskalWallis => "kruskal-wallis",
        }
    }

    /// Human-readable name
    pub fn display_name(self) -> &'static str {
        match self {
            TestKind::TTestIndependent => "Independent t-test",
            TestKind::TTestPaired => "Paired t-test",
            TestKind::Anova => "One-way ANOVA",
            TestKind::ChiSquare => "Chi-square test of independence",
            TestKind::MannWhitney => "Mann-Whitney U test",
            TestKind::Wilcoxon => "Wilcoxon signed-rank test",
            TestKind::KruskalWallis => "Kruskal-Wallis H test",
        }
    }

    /// Whether the test works on ranks rather than raw values
    pub fn is_rank_based(self) -> bool {
        matches!(
            self,
            TestKind::MannWhitney | TestKind::Wilcoxon | TestKind::KruskalWallis
        )
    }

    /// Whether the test pairs rows across its two groups
    pub fn is_paired(self) -> bool {
        matches!(self, TestKind::TTestPaired | TestKind::Wilcoxon)
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TestKind {
    type Err = TestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == s)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| {
                let known: Vec<&str> = TestKind::ALL.iter().map(|k| k.name()).collect();
                TestError::config(format!(
                    "unknown test type '{s}' (expected one of: {})",
                    known.join(", ")
                ))
            })
    }
}

impl TryFrom<String> for TestKind {
    type Error = TestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
