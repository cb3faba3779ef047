//! Analysis records
//!
//! [`AnalysisResult`] is the persisted outcome of one analysis. It is
//! created once by the [`crate::Analyzer`], stamped with an id and a
//! timestamp by the store, and never mutated afterwards. The input
//! observations are stored beside it so the analysis can be rerun.

use crate::dataset::Observation;
use chrono::{DateTime, Utc};
use hypotest_engine::{
    ConfidenceLevel, DegreesOfFreedom, EffectSize, EngineOptions, TestConfiguration, TestKind,
    Verdict,
};
use hypotest_stats::GroupSummary;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Store-assigned identifier, strictly increasing
pub type AnalysisId = u64;

/// Per-group summaries in first-appearance order
///
/// Serialized as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupSummaries(Vec<(String, GroupSummary)>);

impl GroupSummaries {
    /// Wrap ordered `(label, summary)` pairs
    pub fn new(entries: Vec<(String, GroupSummary)>) -> Self {
        Self(entries)
    }

    /// Summary for `label`
    pub fn get(&self, label: &str) -> Option<&GroupSummary> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, s)| s)
    }

    /// Iterate in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GroupSummary)> {
        self.0.iter().map(|(l, s)| (l.as_str(), s))
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no groups
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for GroupSummaries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, summary) in &self.0 {
            map.serialize_entry(label, summary)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for GroupSummaries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = GroupSummaries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of group label to summary")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, summary)) = access.next_entry()? {
                    entries.push((label, summary));
                }
                Ok(GroupSummaries(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// Outcome of one analysis, as stored and returned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Unique id
    pub id: AnalysisId,
    /// Test that was run
    pub test_type: TestKind,
    /// Confidence level the verdict was taken at
    pub confidence_level: ConfidenceLevel,
    /// Test statistic
    pub statistic: f64,
    /// Degrees of freedom, if the reference distribution has any
    pub degrees_of_freedom: Option<DegreesOfFreedom>,
    /// Median of every value in the dataset
    pub median: f64,
    /// Population standard deviation of every value in the dataset
    pub std_dev: f64,
    /// p-value in [0, 1]
    pub p_value: f64,
    /// Significance verdict
    pub verdict: Verdict,
    /// Standardised effect size
    pub effect_size: Option<EffectSize>,
    /// Creation time (strictly increasing with `id`)
    pub created_at: DateTime<Utc>,
    /// Name of the uploaded file
    pub filename: String,
    /// Summary statistics per group
    pub groups: GroupSummaries,
    /// Engine options the statistic was computed with; reruns reuse them
    #[serde(default)]
    pub options: EngineOptions,
}

impl AnalysisResult {
    /// The test configuration this result was computed with
    pub fn configuration(&self) -> TestConfiguration {
        TestConfiguration::new(self.test_type, self.confidence_level)
    }

    /// Recompute the verdict from the stored p-value and confidence level
    pub fn recomputed_verdict(&self) -> Verdict {
        Verdict::decide(self.p_value, self.confidence_level)
    }
}

/// A stored result together with the input it was computed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// The result
    pub result: AnalysisResult,
    /// Input observations in upload order
    pub observations: Vec<Observation>,
}

/// Everything about an analysis except what the store assigns
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnalysis {
    /// Test configuration
    pub configuration: TestConfiguration,
    /// Engine options used
    pub options: EngineOptions,
    /// Test statistic
    pub statistic: f64,
    /// Degrees of freedom
    pub degrees_of_freedom: Option<DegreesOfFreedom>,
    /// Overall median
    pub median: f64,
    /// Overall population standard deviation
    pub std_dev: f64,
    /// p-value
    pub p_value: f64,
    /// Effect size
    pub effect_size: Option<EffectSize>,
    /// Uploaded file name
    pub filename: String,
    /// Per-group summaries
    pub groups: GroupSummaries,
    /// Input observations
    pub observations: Vec<Observation>,
}

impl NewAnalysis {
    /// Stamp with an id and creation time
    pub fn into_record(self, id: AnalysisId, created_at: DateTime<Utc>) -> AnalysisRecord {
        let verdict = self.configuration.verdict(self.p_value);
        AnalysisRecord {
            result: AnalysisResult {
                id,
                test_type: self.configuration.kind,
                confidence_level: self.configuration.confidence,
                statistic: self.statistic,
                degrees_of_freedom: self.degrees_of_freedom,
                median: self.median,
                std_dev: self.std_dev,
                p_value: self.p_value,
                verdict,
                effect_size: self.effect_size,
                created_at,
                filename: self.filename,
                groups: self.groups,
                options: self.options,
            },
            observations: self.observations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypotest_stats::compute_summary;

    #[test]
    fn test_group_summaries_keep_order() {
        let groups = GroupSummaries::new(vec![
            ("zeta".into(), compute_summary(&[1.0, 2.0]).unwrap()),
            ("alpha".into(), compute_summary(&[3.0]).unwrap()),
        ]);

        let json = serde_json::to_string(&groups).unwrap();
        let zeta = json.find("zeta").unwrap();
        let alpha = json.find("alpha").unwrap();
        assert!(zeta < alpha);

        let back: GroupSummaries = serde_json::from_str(&json).unwrap();
        assert_eq!(back, groups);
        assert_eq!(back.get("alpha").unwrap().count, 1);
    }

    #[test]
    fn test_record_round_trip() {
        let new = NewAnalysis {
            configuration: TestConfiguration::new(
                TestKind::Anova,
                ConfidenceLevel::new(0.9).unwrap(),
            ),
            options: EngineOptions {
                yates_correction: true,
            },
            statistic: 27.0,
            degrees_of_freedom: Some(DegreesOfFreedom::Pair(2.0, 6.0)),
            median: 5.0,
            std_dev: 2.5,
            p_value: 0.001,
            effect_size: None,
            filename: "scores.csv".into(),
            groups: GroupSummaries::default(),
            observations: vec![Observation::new("a", 1.0)],
        };
        let record = new.into_record(7, Utc::now());
        assert_eq!(record.result.verdict, Verdict::Significant);
        assert_eq!(record.result.recomputed_verdict(), record.result.verdict);

        let json = serde_json::to_string(&record).unwrap();
        let back: AnalysisRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert!(back.result.options.yates_correction);
    }

    #[test]
    fn test_record_without_options_reads_as_default() {
        let new = NewAnalysis {
            configuration: TestConfiguration::new(
                TestKind::ChiSquare,
                ConfidenceLevel::new(0.95).unwrap(),
            ),
            options: EngineOptions::default(),
            statistic: 2.0,
            degrees_of_freedom: Some(DegreesOfFreedom::Single(1.0)),
            median: 1.5,
            std_dev: 0.5,
            p_value: 0.157,
            effect_size: None,
            filename: "old.csv".into(),
            groups: GroupSummaries::default(),
            observations: vec![Observation::new("a", 1.0)],
        };
        let record = new.into_record(1, Utc::now());

        let mut json = serde_json::to_value(&record).unwrap();
        json["result"].as_object_mut().unwrap().remove("options");
        let back: AnalysisRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.result.options, EngineOptions::default());
        assert_eq!(back, record);
    }
}
