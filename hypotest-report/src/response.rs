//! Boundary response shapes

use crate::interpretation::{Interpretation, interpret};
use chrono::{DateTime, Utc};
use hypotest_core::{AnalysisId, AnalysisRecord, GroupSummaries, Observation};
use hypotest_engine::{DegreesOfFreedom, EffectSize, TestKind};
use serde::{Deserialize, Serialize};

/// One analysis as returned by `/upload`, `/rerun` and `/history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Analysis id
    pub id: AnalysisId,
    /// Canonical test name
    pub test_type: TestKind,
    /// Human-readable test name
    pub test_name: String,
    /// Confidence level as a fraction
    pub confidence_level: f64,
    /// Test statistic
    pub statistic: f64,
    /// Degrees of freedom: a number, a `[between, within]` pair, or null
    pub degrees_of_freedom: Option<DegreesOfFreedom>,
    /// Median of all values
    pub median: f64,
    /// Population standard deviation of all values
    pub std_dev: f64,
    /// p-value
    pub p_value: f64,
    /// "Statistically significant" or "Not statistically significant"
    pub result: String,
    /// Verdict as a boolean
    pub significant: bool,
    /// Effect size, when the test defines one
    pub effect_size: Option<EffectSize>,
    /// RFC 3339 creation time
    pub created_at: DateTime<Utc>,
    /// Uploaded file name
    pub filename: String,
    /// Per-group summaries
    pub groups: GroupSummaries,
    /// Flattened input rows
    pub data: Vec<Observation>,
    /// Plain-language reading
    pub interpretation: Interpretation,
}

impl From<&AnalysisRecord> for AnalysisResponse {
    fn from(record: &AnalysisRecord) -> Self {
        let result = &record.result;
        let verdict = result.recomputed_verdict();
        Self {
            id: result.id,
            test_type: result.test_type,
            test_name: result.test_type.display_name().to_string(),
            confidence_level: result.confidence_level.value(),
            statistic: result.statistic,
            degrees_of_freedom: result.degrees_of_freedom,
            median: result.median,
            std_dev: result.std_dev,
            p_value: result.p_value,
            result: verdict.label().to_string(),
            significant: verdict.is_significant(),
            effect_size: result.effect_size,
            created_at: result.created_at,
            filename: result.filename.clone(),
            groups: result.groups.clone(),
            data: record.observations.clone(),
            interpretation: interpret(result),
        }
    }
}

/// `/health` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" while the process serves requests
    pub status: String,
    /// Crate version
    pub version: String,
}

impl HealthResponse {
    /// Healthy response for `version`
    pub fn ok(version: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            version: version.into(),
        }
    }
}

/// Error body returned by every failing route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Taxonomy name, e.g. "malformed_dataset"
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypotest_core::{Analyzer, MemoryStore, RawRow};
    use std::sync::Arc;

    #[test]
    fn test_response_shape() {
        let analyzer = Analyzer::new(Arc::new(MemoryStore::new()));
        let rows = [("A", "1"), ("A", "2"), ("A", "3"), ("B", "1"), ("B", "2"), ("B", "3")]
            .iter()
            .map(|(g, v)| RawRow::new(*g, *v));
        let record = analyzer
            .analyze_rows(rows, "t-test", 0.95, "same.csv")
            .unwrap();

        let response = AnalysisResponse::from(&record);
        assert_eq!(response.result, "Not statistically significant");
        assert!(!response.significant);
        assert_eq!(response.data.len(), 6);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["test_type"], "t-test-independent");
        assert_eq!(json["confidence_level"], 0.95);
        assert_eq!(json["degrees_of_freedom"], 4.0);
        assert_eq!(json["groups"]["A"]["count"], 3);
        assert_eq!(json["data"][3]["group"], "B");
        assert!(json["created_at"].as_str().unwrap().contains('T'));
        assert_eq!(json["interpretation"]["title"], "Independent t-test");
    }
}
