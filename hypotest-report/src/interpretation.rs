//! Result interpretation
//!
//! Plain-language reading of a result, chosen by test kind and verdict.
//! The verdict always comes from [`AnalysisResult::recomputed_verdict`] so
//! the text can never disagree with the boolean shown next to it.

use crate::human::format_p_value;
use hypotest_core::AnalysisResult;
use hypotest_engine::{EffectMagnitude, TestKind};
use serde::{Deserialize, Serialize};

/// Human-readable explanation of a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpretation {
    /// Heading, e.g. "One-way ANOVA"
    pub title: String,
    /// What the test found, with the p-value and threshold
    pub explanation: String,
    /// What the finding means in practice
    pub what_it_means: String,
    /// Suggested follow-up
    pub next_steps: String,
}

/// Per-test wording
struct Wording {
    /// What differs: "the means of the two groups", ...
    subject: &'static str,
    /// Meaning when significant
    found: &'static str,
    /// Meaning when not significant
    not_found: &'static str,
    /// Follow-up when significant
    follow_up: &'static str,
}

fn wording(kind: TestKind) -> Wording {
    match kind {
        TestKind::TTestIndependent => Wording {
            subject: "the means of the two groups",
            found: "The groups differ on average by more than sampling noise would explain.",
            not_found: "No difference between the group means could be detected.",
            follow_up: "Check the effect size to judge whether the difference matters in practice.",
        },
        TestKind::TTestPaired => Wording {
            subject: "the paired measurements",
            found: "The paired values changed consistently between the two conditions.",
            not_found: "No consistent change between the paired measurements could be detected.",
            follow_up: "Look at the direction of the per-pair differences and the effect size.",
        },
        TestKind::Anova => Wording {
            subject: "the group means",
            found: "At least one group mean differs from the others.",
            not_found: "No difference among the group means could be detected.",
            follow_up: "ANOVA does not say which groups differ; run a post-hoc test such as Tukey's HSD.",
        },
        TestKind::ChiSquare => Wording {
            subject: "the distribution of values across groups",
            found: "Value frequencies depend on the group; the two variables are associated.",
            not_found: "Value frequencies look independent of the group.",
            follow_up: "Inspect the cells with the largest deviations; Cramér's V gives the strength of the association.",
        },
        TestKind::MannWhitney => Wording {
            subject: "the distributions of the two groups",
            found: "Values in one group tend to be larger than in the other.",
            not_found: "Neither group tends to have larger values than the other.",
            follow_up: "Compare the group medians to see which way the shift goes.",
        },
        TestKind::Wilcoxon => Wording {
            subject: "the paired measurements",
            found: "The paired values shifted consistently in one direction.",
            not_found: "No consistent shift between the paired measurements could be detected.",
            follow_up: "Look at the direction of the per-pair differences and the effect size.",
        },
        TestKind::KruskalWallis => Wording {
            subject: "the distributions of the groups",
            found: "At least one group tends to have larger or smaller values than the others.",
            not_found: "No difference among the group distributions could be detected.",
            follow_up: "Kruskal-Wallis does not say which groups differ; run a post-hoc test such as Dunn's test.",
        },
    }
}

/// Shortest fixed-point form of a significance level, e.g. `0.05` or `0.005`
fn format_alpha(alpha: f64) -> String {
    if alpha < 1e-4 {
        return format!("{alpha:.3e}");
    }
    let fixed = format!("{alpha:.6}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Interpret a stored result
pub fn interpret(result: &AnalysisResult) -> Interpretation {
    let kind = result.test_type;
    let words = wording(kind);
    let alpha = format_alpha(result.confidence_level.alpha());
    let p_value = format_p_value(result.p_value);
    let significant = result.recomputed_verdict().is_significant();

    let explanation = if significant {
        format!(
            "The {} found a statistically significant difference in {} (p = {} < α = {}).",
            kind.display_name(),
            words.subject,
            p_value,
            alpha
        )
    } else {
        format!(
            "The {} found no statistically significant difference in {} (p = {} ≥ α = {}).",
            kind.display_name(),
            words.subject,
            p_value,
            alpha
        )
    };

    let what_it_means = if significant {
        words.found.to_string()
    } else {
        words.not_found.to_string()
    };

    let next_steps = match (significant, result.effect_size) {
        (true, Some(effect)) if effect.magnitude == EffectMagnitude::Negligible => format!(
            "The effect is negligible ({effect}); the result may be significant without being important. {}",
            words.follow_up
        ),
        (true, Some(effect)) => format!("Effect size: {effect}. {}", words.follow_up),
        (true, None) => words.follow_up.to_string(),
        (false, _) => "The sample may be too small to detect a real effect; consider a power analysis or collecting more data.".to_string(),
    };

    Interpretation {
        title: kind.display_name().to_string(),
        explanation,
        what_it_means,
        next_steps,
    }
}
