//! JSON Output

use crate::response::AnalysisResponse;

/// Pretty-printed JSON for one analysis
pub fn generate_json_analysis(response: &AnalysisResponse) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(response)
}

/// Pretty-printed JSON array for a history listing
pub fn generate_json_history(history: &[AnalysisResponse]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(history)
}
