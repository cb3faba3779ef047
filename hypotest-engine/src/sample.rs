//! Grouped Samples
//!
//! Values partitioned by group label. Groups keep first-appearance order so
//! two-group tests are oriented the way the data was written (the first
//! label seen is the first sample), and values keep row order within each
//! group so paired tests can pair row `i` of one group with row `i` of the
//! other.

use crate::error::TestError;
use fxhash::FxHashMap;

/// One labelled group of values
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Group label (non-empty, case-sensitive)
    pub label: String,
    /// Values in input row order
    pub values: Vec<f64>,
}

/// Values partitioned by label
///
/// Invariants: at least one group, labels are unique and non-empty, every
/// group has at least one finite value.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSample {
    groups: Vec<Group>,
}

impl GroupedSample {
    /// Group `(label, value)` pairs in first-appearance order
    ///
    /// # Examples
    ///
    /// ```
    /// # use hypotest_engine::GroupedSample;
    /// let sample = GroupedSample::from_pairs([("b", 1.0), ("a", 2.0), ("b", 3.0)]).unwrap();
    /// assert_eq!(sample.labels(), vec!["b", "a"]);
    /// assert_eq!(sample.group(0).values, vec![1.0, 3.0]);
    /// ```
    pub fn from_pairs<L, I>(pairs: I) -> Result<Self, TestError>
    where
        L: AsRef<str>,
        I: IntoIterator<Item = (L, f64)>,
    {
        let mut index: FxHashMap<String, usize> = FxHashMap::default();
        let mut groups: Vec<Group> = Vec::new();

        for (label, value) in pairs {
            let label = label.as_ref();
            let slot = match index.get(label) {
                Some(&slot) => slot,
                None => {
                    index.insert(label.to_string(), groups.len());
                    groups.push(Group {
                        label: label.to_string(),
                        values: Vec::new(),
                    });
                    groups.len() - 1
                }
            };
            groups[slot].values.push(value);
        }

        Self::new(groups)
    }

    /// Build from explicit groups, validating the invariants
    pub fn new(groups: Vec<Group>) -> Result<Self, TestError> {
        if groups.is_empty() {
            return Err(TestError::config("dataset has no groups"));
        }

        let mut seen: FxHashMap<&str, ()> = FxHashMap::default();
        for group in &groups {
            if group.label.is_empty() {
                return Err(TestError::config("group labels must be non-empty"));
            }
            if seen.insert(group.label.as_str(), ()).is_some() {
                return Err(TestError::config(format!(
                    "duplicate group label '{}'",
                    group.label
                )));
            }
            if group.values.is_empty() {
                return Err(TestError::config(format!(
                    "group '{}' has no values",
                    group.label
                )));
            }
            if let Some(bad) = group.values.iter().find(|v| !v.is_finite()) {
                return Err(TestError::config(format!(
                    "group '{}' contains non-finite value {bad}",
                    group.label
                )));
            }
        }

        Ok(Self { groups })
    }

    /// Number of groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of values across groups
    pub fn total_count(&self) -> usize {
        self.groups.iter().map(|g| g.values.len()).sum()
    }

    /// Group at position `i` (first-appearance order)
    ///
    /// # Panics
    ///
    /// Panics if `i >= group_count()`.
    pub fn group(&self, i: usize) -> &Group {
        &self.groups[i]
    }

    /// Group with the given label
    pub fn get(&self, label: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.label == label)
    }

    /// All groups in order
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Labels in order
    pub fn labels(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.label.as_str()).collect()
    }

    /// Every value, group by group
    pub fn pooled_values(&self) -> Vec<f64> {
        self.groups
            .iter()
            .flat_map(|g| g.values.iter().copied())
            .collect()
    }

    /// Value slices, group by group
    pub fn value_slices(&self) -> Vec<&[f64]> {
        self.groups.iter().map(|g| g.values.as_slice()).collect()
    }
}
