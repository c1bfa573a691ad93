//! Error reporting: a machine-readable JSON report and a human-readable
//! summary with remediation hints.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::batch::{BatchSummary, RowFailure};
use crate::error::{LadleError, Result};

/// How many offending inputs to show per failure group in the human report.
const TOP_N: usize = 10;

/// Machine-readable wrapper around the batch summary.
#[derive(Debug, Serialize)]
pub struct ErrorReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub summary: &'a BatchSummary,
}

/// Write the machine-readable JSON report.
pub fn write_machine_report<W: Write>(summary: &BatchSummary, writer: &mut W) -> Result<()> {
    let report = ErrorReport {
        generated_at: Utc::now(),
        summary,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writer
        .write_all(b"\n")
        .map_err(|e| LadleError::io("<report>", e))
}

/// Suggested remediation per failure code.
fn remediation(code: &str) -> &'static str {
    match code {
        "NO_MATCH" => "Add the ingredient to the master table (or an alias for it).",
        "LOW_CONFIDENCE" => "Review the candidates and add an alias for the right ingredient.",
        "MULTI_INGREDIENT_LINE" => "Split into separate ingredient lines upstream.",
        "H0_NO_DENSITY" => "Add a density row for the (ingredient, form) pair.",
        "SANITY_RANGE_EDGE" => "Verify the density value; it sits outside the plausible band.",
        "NO_NUMERIC_QUANTITY" => "Check the quantity text; it did not parse to a number.",
        _ => "Inspect the offending rows.",
    }
}

/// Write the human-readable report: counts per code, top offending inputs,
/// and what to do about each group.
pub fn write_human_report<W: Write>(summary: &BatchSummary, writer: &mut W) -> Result<()> {
    let io = |e| LadleError::io("<report>", e);
    let mut w = |s: String| writer.write_all(s.as_bytes()).map_err(io);

    w(format!("{}\n", "=".repeat(72)))?;
    w("STAGE-2 CANONICALIZATION REPORT\n".to_string())?;
    w(format!(
        "Generated: {}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ))?;
    w(format!("{}\n\n", "=".repeat(72)))?;

    w(format!("Input lines:        {}\n", summary.total_lines))?;
    w(format!("Accepted:           {}\n", summary.accepted))?;
    w(format!("Rejected:           {}\n", summary.rejected))?;
    w(format!("Duplicates skipped: {}\n", summary.duplicates_skipped))?;
    w(format!(
        "Converted:          {} ({:.1}%)\n",
        summary.converted,
        summary.conversion_rate() * 100.0
    ))?;
    w(format!("Unconverted:        {}\n\n", summary.unconverted))?;

    let groups = group_failures(&summary.failures);
    for (code, rows) in &groups {
        w(format!("{}\n", "-".repeat(72)))?;
        w(format!("{code} ({})\n", rows.len()))?;
        w(format!("{}\n", "-".repeat(72)))?;
        for failure in rows.iter().take(TOP_N) {
            w(format!(
                "  {} line {}: \"{}\"\n",
                failure.recipe_id,
                failure.ingredient_line_number,
                failure.ingredient_original_text
            ))?;
            if let Some(detail) = &failure.detail {
                w(format!("      {detail}\n"))?;
            }
        }
        if rows.len() > TOP_N {
            w(format!("  ... and {} more\n", rows.len() - TOP_N))?;
        }
        w(format!("  Action: {}\n\n", remediation(code)))?;
    }

    if !summary.rejections.is_empty() {
        w(format!("{}\n", "-".repeat(72)))?;
        w(format!("REJECTED ROWS ({})\n", summary.rejections.len()))?;
        w(format!("{}\n", "-".repeat(72)))?;
        for rejection in summary.rejections.iter().take(TOP_N) {
            w(format!(
                "  [{}] {} line {}: {}\n",
                rejection.code.label(),
                rejection.recipe_id.as_deref().unwrap_or("?"),
                rejection
                    .ingredient_line_number
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "?".to_string()),
                rejection.detail
            ))?;
        }
        w("\n".to_string())?;
    }

    if !summary.sequence_gaps.is_empty() {
        w(format!("{}\n", "-".repeat(72)))?;
        w(format!("SEQUENCE GAPS ({})\n", summary.sequence_gaps.len()))?;
        w(format!("{}\n", "-".repeat(72)))?;
        for gap in &summary.sequence_gaps {
            let missing: Vec<String> = gap.missing.iter().map(u32::to_string).collect();
            w(format!(
                "  {}: missing line(s) {}\n",
                gap.recipe_id,
                missing.join(", ")
            ))?;
        }
        w("\n".to_string())?;
    }

    if !summary.warning_counts.is_empty() {
        w(format!("{}\n", "-".repeat(72)))?;
        w("WARNINGS\n".to_string())?;
        w(format!("{}\n", "-".repeat(72)))?;
        for (code, count) in &summary.warning_counts {
            w(format!("  {code}: {count}\n"))?;
        }
    }

    Ok(())
}

fn group_failures(failures: &[RowFailure]) -> BTreeMap<&str, Vec<&RowFailure>> {
    let mut groups: BTreeMap<&str, Vec<&RowFailure>> = BTreeMap::new();
    for failure in failures {
        groups.entry(failure.code.as_str()).or_default().push(failure);
    }
    groups
}
