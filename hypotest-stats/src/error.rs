//! Error types for statistical primitives

use thiserror::Error;

/// Errors from descriptive statistics and distribution functions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// The sample has no values
    #[error("sample is empty")]
    EmptySample,

    /// A parameter is outside the domain of the computation
    #[error("invalid parameter for {function}: {reason}")]
    InvalidParameter {
        /// Computation that rejected the parameter
        function: &'static str,
        /// What was wrong with it
        reason: String,
    },
}

impl StatsError {
    pub(crate) fn invalid(function: &'static str, reason: impl Into<String>) -> Self {
        StatsError::InvalidParameter {
            function,
            reason: reason.into(),
        }
    }
}
