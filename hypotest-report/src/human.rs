//! Terminal Output
//!
//! Human-readable rendering of analyses and history listings.

use crate::response::AnalysisResponse;

/// Fixed-point for ordinary p-values, scientific notation for tiny ones
pub fn format_p_value(p: f64) -> String {
    if p != 0.0 && p < 1e-4 {
        format!("{p:.3e}")
    } else {
        format!("{p:.6}")
    }
}

/// Format one analysis for terminal display
pub fn format_analysis(response: &AnalysisResponse) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!("Analysis #{}: {}\n", response.id, response.test_name));
    output.push_str(&"=".repeat(60));
    output.push('\n');

    let icon = if response.significant { "✓" } else { "✗" };
    output.push_str(&format!("  file:        {}\n", response.filename));
    output.push_str(&format!(
        "  created:     {}\n",
        response.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!(
        "  confidence:  {}%\n",
        response.confidence_level * 100.0
    ));
    match &response.degrees_of_freedom {
        Some(df) => output.push_str(&format!(
            "  statistic:   {:.4}  (df = {df})\n",
            response.statistic
        )),
        None => output.push_str(&format!("  statistic:   {:.4}\n", response.statistic)),
    }
    output.push_str(&format!(
        "  p-value:     {}\n",
        format_p_value(response.p_value)
    ));
    output.push_str(&format!("  verdict:     {icon} {}\n", response.result));
    if let Some(effect) = &response.effect_size {
        output.push_str(&format!("  effect size: {effect}\n"));
    }
    output.push_str(&format!(
        "  overall:     median {:.4}  std dev {:.4}  n = {}\n",
        response.median,
        response.std_dev,
        response.data.len()
    ));

    output.push_str("\nGroups\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');

    let width = response
        .groups
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(5)
        .max(5);
    output.push_str(&format!(
        "  {:<width$}  {:>5}  {:>10}  {:>10}  {:>10}  {:>8}\n",
        "Group", "n", "mean", "median", "std dev", "outliers"
    ));
    for (label, summary) in response.groups.iter() {
        output.push_str(&format!(
            "  {:<width$}  {:>5}  {:>10.4}  {:>10.4}  {:>10.4}  {:>8}\n",
            label, summary.count, summary.mean, summary.median, summary.std_dev, summary.outlier_count
        ));
    }

    let interpretation = &response.interpretation;
    output.push_str(&format!("\n{}\n", interpretation.explanation));
    output.push_str(&format!("{}\n", interpretation.what_it_means));
    output.push_str(&format!("Next: {}\n", interpretation.next_steps));

    output
}

/// Format a history listing as an aligned table
pub fn format_history(history: &[AnalysisResponse]) -> String {
    if history.is_empty() {
        return "No analyses stored.\n".to_string();
    }

    let mut output = String::new();
    let name_width = history
        .iter()
        .map(|h| h.filename.chars().count())
        .max()
        .unwrap_or(8)
        .max(8);

    output.push_str(&format!(
        "  {:>5}  {:<20}  {:<name_width$}  {:<18}  {:>12}  {}\n",
        "id", "created", "filename", "test", "p-value", "result"
    ));
    output.push_str(&format!("  {}\n", "-".repeat(name_width + 80)));

    for entry in history {
        let icon = if entry.significant { "✓" } else { "✗" };
        output.push_str(&format!(
            "  {:>5}  {:<20}  {:<name_width$}  {:<18}  {:>12}  {icon} {}\n",
            entry.id,
            entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.filename,
            entry.test_type.name(),
            format_p_value(entry.p_value),
            entry.result
        ));
    }

    output
}
