//! CSV Output
//!
//! One row per analysis, for spreadsheets.

use crate::response::AnalysisResponse;

/// Column order of the history export
pub const HISTORY_CSV_HEADER: [&str; 8] = [
    "id",
    "created_at",
    "filename",
    "test_type",
    "confidence_level",
    "statistic",
    "p_value",
    "result",
];

/// Render history as CSV with a header row
pub fn generate_csv_history(history: &[AnalysisResponse]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HISTORY_CSV_HEADER)?;

    for entry in history {
        writer.write_record([
            entry.id.to_string(),
            entry.created_at.to_rfc3339(),
            entry.filename.clone(),
            entry.test_type.name().to_string(),
            entry.confidence_level.to_string(),
            entry.statistic.to_string(),
            entry.p_value.to_string(),
            entry.result.clone(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
