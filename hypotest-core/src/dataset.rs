//! Dataset ingestion
//!
//! A dataset is an ordered sequence of `(group, value)` observations. Raw
//! rows come from a CSV upload or a JSON body; every row must carry a
//! non-empty group and a value that parses as a finite `f64`. The first bad
//! row fails the whole dataset, nothing is partially ingested.

use hypotest_engine::{GroupedSample, TestError};
use serde::{Deserialize, Serialize};
use std::io::Read;
use thiserror::Error;

/// Name of the required label column
pub const GROUP_COLUMN: &str = "group";
/// Name of the required numeric column
pub const VALUE_COLUMN: &str = "value";

/// Why a dataset was rejected
///
/// Row numbers are 1-based and count data rows only (the CSV header is
/// not row 1).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    /// No data rows at all
    #[error("dataset is empty")]
    Empty,

    /// The header lacks a required column
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    /// A row has no entry for a required column
    #[error("row {row}: missing '{column}'")]
    MissingField {
        /// Offending row
        row: usize,
        /// Column that is missing or blank
        column: &'static str,
    },

    /// A value is not a number
    #[error("row {row}: value '{value}' is not numeric")]
    NotNumeric {
        /// Offending row
        row: usize,
        /// Raw text of the value
        value: String,
    },

    /// A value parsed to NaN or infinity
    #[error("row {row}: value '{value}' is not finite")]
    NotFinite {
        /// Offending row
        row: usize,
        /// Raw text of the value
        value: String,
    },

    /// More rows than the ingestion limit allows
    #[error("dataset exceeds the limit of {limit} rows")]
    TooManyRows {
        /// Configured limit
        limit: usize,
    },

    /// The CSV itself could not be read
    #[error("failed to read CSV: {0}")]
    Csv(String),
}

impl From<csv::Error> for DatasetError {
    fn from(e: csv::Error) -> Self {
        DatasetError::Csv(e.to_string())
    }
}

/// One unvalidated input row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// Group label, if present
    #[serde(default)]
    pub group: Option<String>,
    /// Value text, if present
    #[serde(default)]
    pub value: Option<String>,
}

impl RawRow {
    /// Row with both fields present
    pub fn new(group: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
            value: Some(value.into()),
        }
    }
}

/// A validated `(group, value)` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Group label
    pub group: String,
    /// Finite numeric value
    pub value: f64,
}

impl Observation {
    /// Build an observation
    pub fn new(group: impl Into<String>, value: f64) -> Self {
        Self {
            group: group.into(),
            value,
        }
    }
}

/// Validated, non-empty sequence of observations in input order
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    observations: Vec<Observation>,
}

impl Dataset {
    /// Validate raw rows
    pub fn from_rows<I>(rows: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let observations = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| validate_row(i + 1, row))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_observations(observations)
    }

    /// Validate already-typed observations
    pub fn from_observations(observations: Vec<Observation>) -> Result<Self, DatasetError> {
        if observations.is_empty() {
            return Err(DatasetError::Empty);
        }
        for (i, obs) in observations.iter().enumerate() {
            if obs.group.trim().is_empty() {
                return Err(DatasetError::MissingField {
                    row: i + 1,
                    column: GROUP_COLUMN,
                });
            }
            if !obs.value.is_finite() {
                return Err(DatasetError::NotFinite {
                    row: i + 1,
                    value: obs.value.to_string(),
                });
            }
        }
        Ok(Self { observations })
    }

    /// Read a CSV with `group` and `value` header columns
    ///
    /// Extra columns are ignored and cells are trimmed. With `max_rows` set,
    /// reading stops with [`DatasetError::TooManyRows`] as soon as the limit
    /// is crossed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hypotest_core::Dataset;
    /// let csv = "group,value\nA,1.5\nB,2\n";
    /// let dataset = Dataset::from_csv_reader(csv.as_bytes(), None).unwrap();
    /// assert_eq!(dataset.len(), 2);
    /// ```
    pub fn from_csv_reader<R: Read>(reader: R, max_rows: Option<usize>) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}') == name)
                .ok_or(DatasetError::MissingColumn(name))
        };
        let group_idx = column(GROUP_COLUMN)?;
        let value_idx = column(VALUE_COLUMN)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if let Some(limit) = max_rows {
                if rows.len() >= limit {
                    return Err(DatasetError::TooManyRows { limit });
                }
            }
            rows.push(RawRow {
                group: record.get(group_idx).map(str::to_string),
                value: record.get(value_idx).map(str::to_string),
            });
        }

        Self::from_rows(rows)
    }

    /// Observations in input order
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Consume into the observations
    pub fn into_observations(self) -> Vec<Observation> {
        self.observations
    }

    /// Number of observations (never 0)
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// All values, in input order
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    /// Partition by group label
    pub fn grouped(&self) -> Result<GroupedSample, TestError> {
        GroupedSample::from_pairs(self.observations.iter().map(|o| (o.group.as_str(), o.value)))
    }
}

fn validate_row(row: usize, raw: RawRow) -> Result<Observation, DatasetError> {
    let group = raw
        .group
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty())
        .ok_or(DatasetError::MissingField {
            row,
            column: GROUP_COLUMN,
        })?;
    let text = raw
        .value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(DatasetError::MissingField {
            row,
            column: VALUE_COLUMN,
        })?;

    let value: f64 = text.parse().map_err(|_| DatasetError::NotNumeric {
        row,
        value: text.clone(),
    })?;
    if !value.is_finite() {
        return Err(DatasetError::NotFinite { row, value: text });
    }

    Ok(Observation { group, value })
}
