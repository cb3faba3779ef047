//! Engine error taxonomy

use hypotest_stats::StatsError;
use thiserror::Error;

/// Errors from test routines
///
/// Both variants are deterministic: re-running the same input reproduces
/// the same error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TestError {
    /// The grouped data does not satisfy the test's preconditions
    #[error("invalid test configuration: {0}")]
    InvalidConfiguration(String),

    /// The data is degenerate for the computation (zero variance, df <= 0)
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl TestError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        TestError::InvalidConfiguration(message.into())
    }

    pub(crate) fn parameter(message: impl Into<String>) -> Self {
        TestError::InvalidParameter(message.into())
    }
}

impl From<StatsError> for TestError {
    fn from(e: StatsError) -> Self {
        match e {
            StatsError::EmptySample => TestError::config("a group has no values"),
            StatsError::InvalidParameter { .. } => TestError::InvalidParameter(e.to_string()),
        }
    }
}
