//! Integration tests for Hypotest
//!
//! These tests drive the analyzer end to end: raw rows in, stored and
//! rendered results out.

use hypotest::prelude::*;
use hypotest::{
    AnalysisResponse, DatasetError, EffectMeasure, EngineOptions, OutputFormat, chi_square_sf,
    render_history,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

fn analyzer() -> Analyzer {
    Analyzer::new(Arc::new(MemoryStore::new()))
}

fn rows(groups: Vec<(&str, Vec<f64>)>) -> Vec<RawRow> {
    groups
        .into_iter()
        .flat_map(|(label, values)| values.into_iter().map(move |v| RawRow::new(label, v.to_string())))
        .collect()
}

fn separated() -> Vec<RawRow> {
    rows(vec![
        ("A", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
        ("B", vec![6.0, 7.0, 8.0, 9.0, 10.0]),
    ])
}

/// Fully separated groups give a strongly significant t-test
#[test]
fn test_separated_groups_are_significant() {
    let analyzer = analyzer();
    let record = analyzer
        .analyze_rows(separated(), "t-test-independent", 0.95, "separated.csv")
        .unwrap();
    let result = &record.result;

    assert_eq!(result.test_type, TestKind::TTestIndependent);
    assert!((result.statistic + 5.0).abs() < 1e-9);
    // t = -5 on 8 degrees of freedom
    assert!((result.p_value - 0.001052826).abs() < 1e-8);
    assert!(result.p_value < 0.0011);
    assert_eq!(result.verdict, Verdict::Significant);

    let effect = result.effect_size.unwrap();
    assert_eq!(effect.measure, EffectMeasure::CohensD);
    assert!((effect.value + 10f64.sqrt()).abs() < 1e-9);

    assert_eq!(result.groups.len(), 2);
    assert_eq!(record.observations.len(), 10);
}

/// Identical groups give t = 0 and p = 1
#[test]
fn test_identical_groups_are_not_significant() {
    let analyzer = analyzer();
    let data = rows(vec![("A", vec![1.0, 2.0, 3.0]), ("B", vec![1.0, 2.0, 3.0])]);
    let record = analyzer
        .analyze_rows(data, "t-test", 0.95, "same.csv")
        .unwrap();

    assert!(record.result.statistic.abs() < 1e-12);
    assert!((record.result.p_value - 1.0).abs() < 1e-9);
    assert_eq!(record.result.verdict, Verdict::NotSignificant);
}

/// A row without a value fails the whole request and stores nothing
#[test]
fn test_malformed_dataset_persists_nothing() {
    let analyzer = analyzer();
    analyzer
        .analyze_rows(separated(), "t-test", 0.95, "good.csv")
        .unwrap();

    let mut data = separated();
    data.push(RawRow {
        group: Some("B".to_string()),
        value: None,
    });
    let err = analyzer
        .analyze_rows(data, "t-test", 0.95, "bad.csv")
        .unwrap_err();

    assert!(matches!(
        err,
        AnalysisError::MalformedDataset(DatasetError::MissingField { row: 11, .. })
    ));
    assert!(err.is_client_error());
    assert!(!err.is_retryable());
    assert_eq!(analyzer.history().unwrap().len(), 1);
}

/// Heavy ties across groups: the correction raises H and lowers p
#[test]
fn test_kruskal_wallis_tie_correction_applied() {
    let analyzer = analyzer();
    let data = rows(vec![
        ("A", vec![1.0, 1.0, 1.0, 2.0, 2.0]),
        ("B", vec![1.0, 2.0, 2.0, 2.0, 3.0]),
        ("C", vec![2.0, 3.0, 3.0, 3.0, 3.0]),
    ]);
    let record = analyzer
        .analyze_rows(data, "kruskal-wallis", 0.95, "ties.csv")
        .unwrap();
    let result = &record.result;

    // Uncorrected H = 12 / (N (N + 1)) * sum(R^2 / n) - 3 (N + 1)
    let uncorrected_h = 6.905;
    let uncorrected_p = chi_square_sf(uncorrected_h, 2.0).unwrap();

    assert!((result.statistic - 7.811717171717).abs() < 1e-9);
    assert!(result.statistic > uncorrected_h + 0.5);
    assert!((result.p_value - 0.0201236691741).abs() < 1e-9);
    assert!(result.p_value < uncorrected_p - 0.01);
    assert_eq!(result.verdict, Verdict::Significant);
}

/// Same input and configuration, same numbers
#[test]
fn test_determinism() {
    let analyzer = analyzer();
    for test in ["t-test", "mann-whitney", "wilcoxon", "anova", "chi-square"] {
        let first = analyzer
            .analyze_rows(separated(), test, 0.95, "a.csv")
            .unwrap();
        let second = analyzer
            .analyze_rows(separated(), test, 0.95, "a.csv")
            .unwrap();
        assert_eq!(first.result.statistic, second.result.statistic, "{test}");
        assert_eq!(first.result.p_value, second.result.p_value, "{test}");
        assert_ne!(first.result.id, second.result.id);
    }
}

/// Rerun reproduces the numbers under a new id and a newer timestamp
#[test]
fn test_rerun_semantics() {
    let analyzer = analyzer();
    let original = analyzer
        .analyze_rows(separated(), "mann-whitney", 0.9, "trial.csv")
        .unwrap();
    let rerun = analyzer.rerun(original.result.id).unwrap();

    assert_ne!(rerun.result.id, original.result.id);
    assert!(rerun.result.created_at > original.result.created_at);
    assert_eq!(rerun.result.statistic, original.result.statistic);
    assert_eq!(rerun.result.p_value, original.result.p_value);
    assert_eq!(rerun.result.configuration(), original.result.configuration());
    assert_eq!(rerun.result.filename, "trial.csv");

    let history = analyzer.history().unwrap();
    assert_eq!(history[0].result.id, rerun.result.id);
    assert_eq!(history[1].result.id, original.result.id);

    assert!(matches!(analyzer.rerun(999), Err(AnalysisError::NotFound(999))));
}

/// A rerun through a differently configured analyzer keeps the stored options
#[test]
fn test_rerun_uses_stored_engine_options() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.json");
    let two_by_two = || {
        rows(vec![
            ("A", vec![1.0, 1.0, 1.0, 2.0]),
            ("B", vec![2.0, 2.0, 2.0, 1.0]),
        ])
    };

    let id = {
        let analyzer = Analyzer::new(Arc::new(JsonFileStore::open(&path).unwrap()))
            .with_options(EngineOptions { yates_correction: true });
        let record = analyzer
            .analyze_rows(two_by_two(), "chi-square", 0.95, "table.csv")
            .unwrap();
        assert!((record.result.statistic - 0.5).abs() < 1e-12);
        record.result.id
    };

    let analyzer = Analyzer::new(Arc::new(JsonFileStore::open(&path).unwrap()));
    let rerun = analyzer.rerun(id).unwrap();
    assert!((rerun.result.statistic - 0.5).abs() < 1e-12);
    assert!((rerun.result.p_value - 0.479_500_122).abs() < 1e-6);
    assert!(rerun.result.options.yates_correction);
}

/// Records survive a reopen of the JSON store and ids keep increasing
#[test]
fn test_json_store_persistence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.json");

    let first_id = {
        let analyzer = Analyzer::new(Arc::new(JsonFileStore::open(&path).unwrap()));
        let record = analyzer
            .analyze_rows(separated(), "t-test", 0.95, "persisted.csv")
            .unwrap();
        record.result.id
    };

    let analyzer = Analyzer::new(Arc::new(JsonFileStore::open(&path).unwrap()));
    let history = analyzer.history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].result.filename, "persisted.csv");

    let rerun = analyzer.rerun(first_id).unwrap();
    assert!(rerun.result.id > first_id);
    assert_eq!(rerun.result.p_value, history[0].result.p_value);

    analyzer.delete(first_id).unwrap();
    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.len().unwrap(), 1);
}

/// The stored verdict always matches p < 1 - confidence, before and after a JSON round trip
#[test]
fn test_verdict_consistency() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let analyzer = analyzer();
    let tests = ["t-test", "t-test-paired", "anova", "mann-whitney", "wilcoxon", "kruskal-wallis"];
    let levels = [0.8, 0.9, 0.95, 0.99];

    for _ in 0..60 {
        let n = rng.gen_range(4..10);
        let shift = rng.gen_range(0.0..3.0);
        let a: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..10.0)).collect();
        let b: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..10.0) + shift).collect();
        let test = tests[rng.gen_range(0..tests.len())];
        let level = levels[rng.gen_range(0..levels.len())];

        let data = rows(vec![("A", a), ("B", b)]);
        let record = match analyzer.analyze_rows(data, test, level, "r.csv") {
            Ok(record) => record,
            // Degenerate draws are rejected deterministically; nothing to check
            Err(AnalysisError::InvalidParameter(_)) => continue,
            Err(e) => panic!("{test}: {e}"),
        };

        let result = &record.result;
        let expected = result.p_value < 1.0 - level;
        assert_eq!(result.verdict.is_significant(), expected, "{test} at {level}");
        assert_eq!(result.recomputed_verdict(), result.verdict);

        let json = serde_json::to_string(&record).unwrap();
        let restored: AnalysisRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.result.recomputed_verdict(), result.verdict);

        let response = AnalysisResponse::from(&record);
        assert_eq!(response.significant, expected);
    }
}

/// Legacy labels from the upload form map onto the canonical tests
#[test]
fn test_legacy_test_labels() {
    let analyzer = analyzer();
    let record = analyzer
        .analyze_rows(separated(), "Mann-Whitney U", 0.95, "legacy.csv")
        .unwrap();
    assert_eq!(record.result.test_type, TestKind::MannWhitney);

    let err = analyzer
        .analyze_rows(separated(), "mann", 0.95, "legacy.csv")
        .unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidTestConfiguration(_)));
}

/// History renders in every output format
#[test]
fn test_history_rendering() {
    let analyzer = analyzer();
    analyzer
        .analyze_rows(separated(), "anova", 0.95, "groups.csv")
        .unwrap();
    let history: Vec<AnalysisResponse> = analyzer
        .history()
        .unwrap()
        .iter()
        .map(AnalysisResponse::from)
        .collect();

    let human = render_history(&history, OutputFormat::Human).unwrap();
    assert!(human.contains("groups.csv"));

    let json: serde_json::Value =
        serde_json::from_str(&render_history(&history, OutputFormat::Json).unwrap()).unwrap();
    assert_eq!(json[0]["test_type"], "anova");
    assert_eq!(json[0]["degrees_of_freedom"], serde_json::json!([1.0, 8.0]));

    let csv = render_history(&history, OutputFormat::Csv).unwrap();
    assert_eq!(csv.lines().count(), 2);
}
