//! Analysis error taxonomy

use crate::dataset::DatasetError;
use crate::record::AnalysisId;
use crate::store::StoreError;
use hypotest_engine::TestError;
use hypotest_stats::StatsError;
use thiserror::Error;

/// Everything that can go wrong in an analysis request
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Missing columns, empty dataset or a non-numeric value
    #[error("malformed dataset: {0}")]
    MalformedDataset(#[from] DatasetError),

    /// Test, group count or pairing mismatch
    #[error("invalid test configuration: {0}")]
    InvalidTestConfiguration(String),

    /// Degenerate statistical input
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unknown analysis id
    #[error("analysis {0} not found")]
    NotFound(AnalysisId),

    /// The result store failed
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl From<TestError> for AnalysisError {
    fn from(e: TestError) -> Self {
        match e {
            TestError::InvalidConfiguration(message) => {
                AnalysisError::InvalidTestConfiguration(message)
            }
            TestError::InvalidParameter(message) => AnalysisError::InvalidParameter(message),
        }
    }
}

impl From<StatsError> for AnalysisError {
    fn from(e: StatsError) -> Self {
        TestError::from(e).into()
    }
}

impl AnalysisError {
    /// Stable machine-readable name
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::MalformedDataset(_) => "malformed_dataset",
            AnalysisError::InvalidTestConfiguration(_) => "invalid_test_configuration",
            AnalysisError::InvalidParameter(_) => "invalid_parameter",
            AnalysisError::NotFound(_) => "not_found",
            AnalysisError::Storage(_) => "storage",
        }
    }

    /// Whether the caller's input was at fault
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AnalysisError::Storage(_))
    }

    /// Whether retrying the same request might succeed
    ///
    /// Only storage failures qualify; everything else is deterministic.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AnalysisError::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let err: AnalysisError = TestError::InvalidParameter("zero variance".into()).into();
        assert_eq!(err.kind(), "invalid_parameter");
        assert!(err.is_client_error());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "invalid parameter: zero variance");

        let err: AnalysisError = DatasetError::Empty.into();
        assert_eq!(err.kind(), "malformed_dataset");

        let err = AnalysisError::Storage(StoreError::Corrupt {
            path: "x.json".into(),
            reason: "eof".into(),
        });
        assert!(err.is_retryable());
        assert!(!err.is_client_error());
    }
}
