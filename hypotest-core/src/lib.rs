#![warn(missing_docs)]
//! Hypotest Core
//!
//! Everything between raw uploaded rows and a stored result:
//! - Dataset ingestion (`group,value` rows and CSV files)
//! - Analysis records with per-group summaries
//! - The [`ResultStore`] seam with in-memory and JSON-file stores
//! - The [`Analyzer`] orchestrator (run, rerun, history, delete)

mod analyzer;
mod dataset;
mod error;
mod record;
mod store;

pub use analyzer::{Analyzer, parse_configuration};
pub use dataset::{DatasetError, Dataset, GROUP_COLUMN, Observation, RawRow, VALUE_COLUMN};
pub use error::AnalysisError;
pub use record::{AnalysisId, AnalysisRecord, AnalysisResult, GroupSummaries, NewAnalysis};
pub use store::{JsonFileStore, MemoryStore, ResultStore, StoreError};
