#![warn(missing_docs)]
//! Hypotest Report - Response Shapes and Rendering
//!
//! Turns stored analyses into what callers see:
//! - Boundary response types (`AnalysisResponse`, health and error bodies)
//! - Plain-language interpretation per test and verdict
//! - JSON, CSV and human-readable terminal output

mod csv_output;
mod human;
mod interpretation;
mod json;
mod response;

pub use csv_output::{HISTORY_CSV_HEADER, generate_csv_history};
pub use human::{format_analysis, format_history, format_p_value};
pub use interpretation::{Interpretation, interpret};
pub use json::{generate_json_analysis, generate_json_history};
pub use response::{AnalysisResponse, ErrorResponse, HealthResponse};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable terminal output
    #[default]
    Human,
    /// Pretty-printed JSON
    Json,
    /// CSV (history only; single analyses render as one-row tables)
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Errors from rendering
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// JSON encoding failed
    #[error("JSON rendering failed: {0}")]
    Json(#[from] serde_json::Error),
    /// CSV encoding failed
    #[error("CSV rendering failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Render a history listing in `format`
pub fn render_history(
    history: &[AnalysisResponse],
    format: OutputFormat,
) -> Result<String, RenderError> {
    match format {
        OutputFormat::Human => Ok(format_history(history)),
        OutputFormat::Json => Ok(generate_json_history(history)?),
        OutputFormat::Csv => Ok(generate_csv_history(history)?),
    }
}

/// Render one analysis in `format`
pub fn render_analysis(
    response: &AnalysisResponse,
    format: OutputFormat,
) -> Result<String, RenderError> {
    match format {
        OutputFormat::Human => Ok(format_analysis(response)),
        OutputFormat::Json => Ok(generate_json_analysis(response)?),
        OutputFormat::Csv => Ok(generate_csv_history(std::slice::from_ref(response))?),
    }
}
