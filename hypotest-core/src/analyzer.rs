//! Analysis orchestrator
//!
//! Validates a dataset, dispatches to the engine, adds descriptive
//! statistics and hands the result to the store. A failed analysis
//! persists nothing.

use crate::dataset::{Dataset, RawRow};
use crate::error::AnalysisError;
use crate::record::{AnalysisId, AnalysisRecord, GroupSummaries, NewAnalysis};
use crate::store::ResultStore;
use hypotest_engine::{ConfidenceLevel, EngineOptions, TestConfiguration, TestKind, run_test};
use hypotest_stats::{compute_summary, median, std_dev};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs analyses against an injected [`ResultStore`]
#[derive(Clone)]
pub struct Analyzer {
    store: Arc<dyn ResultStore>,
    options: EngineOptions,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    /// Analyzer with default engine options
    pub fn new(store: Arc<dyn ResultStore>) -> Self {
        Self {
            store,
            options: EngineOptions::default(),
        }
    }

    /// Replace the engine options
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Engine options in effect
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Compute an analysis without storing it
    pub fn evaluate(
        &self,
        dataset: &Dataset,
        configuration: TestConfiguration,
        filename: &str,
    ) -> Result<NewAnalysis, AnalysisError> {
        evaluate_with(dataset, configuration, self.options, filename)
    }

    /// Run, store and return an analysis
    pub fn run_analysis(
        &self,
        dataset: &Dataset,
        configuration: TestConfiguration,
        filename: &str,
    ) -> Result<AnalysisRecord, AnalysisError> {
        self.run_with(dataset, configuration, self.options, filename)
    }

    fn run_with(
        &self,
        dataset: &Dataset,
        configuration: TestConfiguration,
        options: EngineOptions,
        filename: &str,
    ) -> Result<AnalysisRecord, AnalysisError> {
        info!(
            test = %configuration.kind,
            rows = dataset.len(),
            filename,
            "running analysis"
        );

        let analysis = evaluate_with(dataset, configuration, options, filename).map_err(|e| {
            warn!(test = %configuration.kind, kind = e.kind(), error = %e, "analysis rejected");
            e
        })?;
        let record = self.store.insert(analysis)?;

        info!(
            id = record.result.id,
            statistic = record.result.statistic,
            p_value = record.result.p_value,
            verdict = %record.result.verdict,
            "analysis stored"
        );
        Ok(record)
    }

    /// Validate boundary input (raw rows, test name, confidence) and run
    ///
    /// The test name and confidence level are checked before the rows.
    pub fn analyze_rows<I>(
        &self,
        rows: I,
        test_type: &str,
        confidence_level: f64,
        filename: &str,
    ) -> Result<AnalysisRecord, AnalysisError>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let configuration = parse_configuration(test_type, confidence_level)?;
        let dataset = Dataset::from_rows(rows)?;
        self.run_analysis(&dataset, configuration, filename)
    }

    /// Recompute a stored analysis from its input as a new record
    ///
    /// Uses the engine options stored with the original, not this
    /// analyzer's, so a rerun reproduces the original numbers.
    pub fn rerun(&self, id: AnalysisId) -> Result<AnalysisRecord, AnalysisError> {
        let original = self.get(id)?;
        debug!(id, options = ?original.result.options, "rerunning analysis");

        let dataset = Dataset::from_observations(original.observations)?;
        self.run_with(
            &dataset,
            original.result.configuration(),
            original.result.options,
            &original.result.filename,
        )
    }

    /// Stored analysis by id
    pub fn get(&self, id: AnalysisId) -> Result<AnalysisRecord, AnalysisError> {
        self.store.get(id)?.ok_or(AnalysisError::NotFound(id))
    }

    /// Every stored analysis, most recent first
    pub fn history(&self) -> Result<Vec<AnalysisRecord>, AnalysisError> {
        Ok(self.store.list()?)
    }

    /// Delete a stored analysis; unknown ids fail with `NotFound`
    pub fn delete(&self, id: AnalysisId) -> Result<(), AnalysisError> {
        if self.store.delete(id)? {
            info!(id, "analysis deleted");
            Ok(())
        } else {
            Err(AnalysisError::NotFound(id))
        }
    }
}

/// Compute an analysis with explicit engine options
fn evaluate_with(
    dataset: &Dataset,
    configuration: TestConfiguration,
    options: EngineOptions,
    filename: &str,
) -> Result<NewAnalysis, AnalysisError> {
    let sample = dataset.grouped()?;
    let outcome = run_test(configuration.kind, &sample, &options)?;

    let values = dataset.values();
    let groups = sample
        .groups()
        .iter()
        .map(|g| Ok((g.label.clone(), compute_summary(&g.values)?)))
        .collect::<Result<Vec<_>, AnalysisError>>()?;

    Ok(NewAnalysis {
        configuration,
        options,
        statistic: outcome.statistic,
        degrees_of_freedom: outcome.degrees_of_freedom,
        median: median(&values)?,
        std_dev: std_dev(&values)?,
        p_value: outcome.p_value,
        effect_size: outcome.effect_size,
        filename: filename.to_string(),
        groups: GroupSummaries::new(groups),
        observations: dataset.observations().to_vec(),
    })
}

/// Parse a test name and confidence fraction from the boundary
pub fn parse_configuration(
    test_type: &str,
    confidence_level: f64,
) -> Result<TestConfiguration, AnalysisError> {
    let kind: TestKind = test_type.parse()?;
    let confidence = ConfidenceLevel::new(confidence_level)?;
    Ok(TestConfiguration::new(kind, confidence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetError;
    use crate::store::MemoryStore;
    use hypotest_engine::Verdict;

    fn analyzer() -> Analyzer {
        Analyzer::new(Arc::new(MemoryStore::new()))
    }

    fn rows(pairs: &[(&str, &str)]) -> Vec<RawRow> {
        pairs.iter().map(|(g, v)| RawRow::new(*g, *v)).collect()
    }

    fn separated() -> Vec<RawRow> {
        rows(&[
            ("A", "1"),
            ("A", "2"),
            ("A", "3"),
            ("A", "4"),
            ("A", "5"),
            ("B", "6"),
            ("B", "7"),
            ("B", "8"),
            ("B", "9"),
            ("B", "10"),
        ])
    }

    #[test]
    fn test_run_analysis_assembles_record() {
        let analyzer = analyzer();
        let record = analyzer
            .analyze_rows(separated(), "t-test-independent", 0.95, "scores.csv")
            .unwrap();
        let result = &record.result;

        assert_eq!(result.id, 1);
        assert_eq!(result.test_type, TestKind::TTestIndependent);
        assert!((result.statistic + 5.0).abs() < 1e-12);
        assert_eq!(result.verdict, Verdict::Significant);
        // lower-middle of 1..=10
        assert_eq!(result.median, 5.0);
        assert!((result.std_dev - 8.25_f64.sqrt()).abs() < 1e-12);
        assert_eq!(result.groups.len(), 2);
        assert_eq!(result.groups.get("B").unwrap().median, 8.0);
        assert_eq!(record.observations.len(), 10);
        assert_eq!(analyzer.history().unwrap().len(), 1);
    }

    #[test]
    fn test_failures_persist_nothing() {
        let analyzer = analyzer();

        let bad_rows = rows(&[("A", "1"), ("B", "two")]);
        let err = analyzer
            .analyze_rows(bad_rows, "t-test", 0.95, "bad.csv")
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::MalformedDataset(DatasetError::NotNumeric { row: 2, .. })
        ));

        let err = analyzer
            .analyze_rows(separated(), "z-test", 0.95, "x.csv")
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidTestConfiguration(_)));

        let err = analyzer
            .analyze_rows(separated(), "t-test", 95.0, "x.csv")
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidTestConfiguration(_)));

        analyzer
            .analyze_rows(separated(), "anova", 0.95, "x.csv")
            .unwrap();
        let flat = rows(&[("A", "1"), ("A", "1"), ("B", "1"), ("B", "1")]);
        let err = analyzer
            .analyze_rows(flat, "anova", 0.95, "flat.csv")
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidParameter(_)));

        // Only the successful ANOVA was stored
        assert_eq!(analyzer.history().unwrap().len(), 1);
    }

    #[test]
    fn test_rerun_creates_new_record() {
        let analyzer = analyzer();
        let original = analyzer
            .analyze_rows(separated(), "mann-whitney", 0.99, "mw.csv")
            .unwrap();
        let rerun = analyzer.rerun(original.result.id).unwrap();

        assert_ne!(rerun.result.id, original.result.id);
        assert!(rerun.result.created_at > original.result.created_at);
        assert_eq!(rerun.result.statistic, original.result.statistic);
        assert_eq!(rerun.result.p_value, original.result.p_value);
        assert_eq!(rerun.result.confidence_level, original.result.confidence_level);

        // Original is untouched
        assert_eq!(analyzer.get(original.result.id).unwrap(), original);

        let history = analyzer.history().unwrap();
        assert_eq!(history[0].result.id, rerun.result.id);
        assert_eq!(history[1].result.id, original.result.id);
    }

    #[test]
    fn test_not_found() {
        let analyzer = analyzer();
        assert!(matches!(analyzer.rerun(42), Err(AnalysisError::NotFound(42))));
        assert!(matches!(analyzer.delete(42), Err(AnalysisError::NotFound(42))));
        assert!(matches!(analyzer.get(42), Err(AnalysisError::NotFound(42))));
    }

    #[test]
    fn test_delete() {
        let analyzer = analyzer();
        let record = analyzer
            .analyze_rows(separated(), "kruskal-wallis", 0.95, "kw.csv")
            .unwrap();
        analyzer.delete(record.result.id).unwrap();
        assert!(analyzer.history().unwrap().is_empty());
        assert!(matches!(
            analyzer.delete(record.result.id),
            Err(AnalysisError::NotFound(_))
        ));
    }

    #[test]
    fn test_yates_option_reaches_engine() {
        let two_by_two = || {
            rows(&[
                ("A", "1"),
                ("A", "1"),
                ("A", "1"),
                ("A", "2"),
                ("B", "2"),
                ("B", "2"),
                ("B", "2"),
                ("B", "1"),
            ])
        };
        let plain = analyzer()
            .analyze_rows(two_by_two(), "chi-square", 0.95, "c.csv")
            .unwrap();
        let corrected = analyzer()
            .with_options(EngineOptions {
                yates_correction: true,
            })
            .analyze_rows(two_by_two(), "chi-square", 0.95, "c.csv")
            .unwrap();
        assert!((plain.result.statistic - 2.0).abs() < 1e-12);
        assert!((corrected.result.statistic - 0.5).abs() < 1e-12);
        assert!(!plain.result.options.yates_correction);
        assert!(corrected.result.options.yates_correction);
    }

    #[test]
    fn test_rerun_keeps_original_options() {
        let store = Arc::new(MemoryStore::new());
        let corrected = Analyzer::new(store.clone()).with_options(EngineOptions {
            yates_correction: true,
        });
        let plain = Analyzer::new(store);

        let two_by_two = || {
            rows(&[
                ("A", "1"),
                ("A", "1"),
                ("A", "1"),
                ("A", "2"),
                ("B", "2"),
                ("B", "2"),
                ("B", "2"),
                ("B", "1"),
            ])
        };
        let original = corrected
            .analyze_rows(two_by_two(), "chi-square", 0.95, "c.csv")
            .unwrap();
        assert!((original.result.statistic - 0.5).abs() < 1e-12);

        // Rerun through an analyzer without the correction
        let rerun = plain.rerun(original.result.id).unwrap();
        assert_eq!(rerun.result.statistic, original.result.statistic);
        assert_eq!(rerun.result.p_value, original.result.p_value);
        assert_eq!(rerun.result.verdict, original.result.verdict);
        assert!(rerun.result.options.yates_correction);

        // And the other way round
        let fresh = plain
            .analyze_rows(two_by_two(), "chi-square", 0.95, "c.csv")
            .unwrap();
        let rerun = corrected.rerun(fresh.result.id).unwrap();
        assert!((rerun.result.statistic - 2.0).abs() < 1e-12);
        assert!(!rerun.result.options.yates_correction);
    }
}
