#![warn(missing_docs)]
//! # Hypotest
//!
//! Statistical hypothesis testing over `group,value` datasets.
//!
//! Hypotest runs one of seven classical tests on uploaded data and keeps a
//! history of results:
//! - **Parametric tests**: independent and paired t-tests, one-way ANOVA
//! - **Rank-based tests**: Mann-Whitney U, Wilcoxon signed-rank and Kruskal-Wallis H, tie-corrected
//! - **Contingency**: chi-square test of independence with optional Yates correction
//! - **Effect sizes**: Cohen's d, η², Cramér's V, rank-based r (|z|/√N) and ε² with magnitude bands
//! - **History**: in-memory or JSON-file result stores with rerun and delete
//! - **Surfaces**: a CLI with human, JSON and CSV output, and an HTTP API
//!
//! ## Quick Start
//!
//! ```
//! use hypotest::prelude::*;
//! use std::sync::Arc;
//!
//! let analyzer = Analyzer::new(Arc::new(MemoryStore::new()));
//! let rows = [("A", "1"), ("A", "2"), ("A", "3"), ("B", "7"), ("B", "8"), ("B", "9")]
//!     .into_iter()
//!     .map(|(group, value)| RawRow::new(group, value));
//!
//! let record = analyzer.analyze_rows(rows, "t-test", 0.95, "trial.csv").unwrap();
//! assert_eq!(record.result.test_type, TestKind::TTestIndependent);
//! assert!(record.result.verdict.is_significant());
//! ```

// Re-export descriptive statistics and distributions
pub use hypotest_stats::{
    GroupSummary, StatsError, chi_square_cdf, chi_square_sf, compute_summary, f_cdf, f_sf, mean,
    median, normal_cdf, normal_sf, quartiles, rank, rank_joint, std_dev, student_t_cdf,
    student_t_sf, variance,
};

// Re-export the test engine
pub use hypotest_engine::{
    ConfidenceLevel, DegreesOfFreedom, EffectMagnitude, EffectMeasure, EffectSize, EngineOptions,
    GroupedSample, TestConfiguration, TestError, TestKind, TestOutcome, Verdict, run_test,
};

// Re-export orchestration and storage
pub use hypotest_core::{
    AnalysisError, AnalysisId, AnalysisRecord, AnalysisResult, Analyzer, Dataset, DatasetError,
    JsonFileStore, MemoryStore, Observation, RawRow, ResultStore, StoreError,
    parse_configuration,
};

// Re-export reporting
pub use hypotest_report::{
    AnalysisResponse, Interpretation, OutputFormat, interpret, render_analysis, render_history,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AnalysisError, AnalysisRecord, Analyzer, ConfidenceLevel, Dataset, JsonFileStore,
        MemoryStore, RawRow, ResultStore, TestKind, Verdict,
    };
}

/// Run the Hypotest CLI.
///
/// Call this from a binary's `main()`:
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     hypotest::run()
/// }
/// ```
pub use hypotest_cli::run;
