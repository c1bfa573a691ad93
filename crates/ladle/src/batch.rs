//! Streaming batch driver: NDJSON in, NDJSON out, summary at the end.
//!
//! The driver never interprets data; it routes rows through the pipeline,
//! deduplicates by idempotency key, and accumulates the run summary. Memory
//! stays bounded: records stream straight to the writer, only failure
//! classifications are retained for reporting.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::io::{BufRead, Write};

use serde::Serialize;

use crate::error::{LadleError, Result};
use crate::pipeline::{intake, IntakeOutcome, Pipeline, Rejection};
use crate::record::{
    BridgeSelectionPath, BridgeWarning, CanonicalRecord, LinkMethod, LinkReason, QtyWarning,
    RawRow, RejectCode,
};

/// One row that was processed but produced no canonical numbers.
#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    pub recipe_id: String,
    pub ingredient_line_number: u32,
    pub ingredient_original_text: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Missing line numbers for one recipe.
#[derive(Debug, Clone, Serialize)]
pub struct SequenceGap {
    pub recipe_id: String,
    pub missing: Vec<u32>,
}

/// Aggregate outcome of a batch run.
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub total_lines: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub duplicates_skipped: usize,
    pub converted: usize,
    pub unconverted: usize,
    /// Row failures grouped later by `code` in the reports.
    pub failures: Vec<RowFailure>,
    pub rejections: Vec<Rejection>,
    /// Warning code → occurrences across all records.
    pub warning_counts: BTreeMap<String, usize>,
    pub sequence_gaps: Vec<SequenceGap>,
}

impl BatchSummary {
    /// Fraction of accepted rows that produced canonical numbers.
    pub fn conversion_rate(&self) -> f64 {
        if self.accepted == 0 {
            return 0.0;
        }
        self.converted as f64 / self.accepted as f64
    }
}

/// Process an NDJSON stream, writing one canonical record per accepted row.
pub fn process_stream<R: BufRead, W: Write>(
    pipeline: &Pipeline,
    input: R,
    output: &mut W,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();
    let mut seen_keys: HashSet<String> = HashSet::new();
    let mut sequences: HashMap<String, BTreeSet<u32>> = HashMap::new();

    for line in input.lines() {
        let line = line.map_err(|e| LadleError::io("<input>", e))?;
        if line.trim().is_empty() {
            continue;
        }
        summary.total_lines += 1;

        let raw: RawRow = match serde_json::from_str(&line) {
            Ok(raw) => raw,
            Err(e) => {
                summary.rejected += 1;
                summary.rejections.push(Rejection {
                    code: RejectCode::TypeMismatch,
                    detail: format!("line is not a valid record: {e}"),
                    recipe_id: None,
                    ingredient_line_number: None,
                    ingredient_original_text: None,
                });
                continue;
            }
        };

        let row = match intake::validate(&raw) {
            IntakeOutcome::Accepted(row) => row,
            IntakeOutcome::Rejected(rejection) => {
                summary.rejected += 1;
                summary.rejections.push(rejection);
                continue;
            }
        };

        // Idempotent re-runs: a key already emitted is skipped silently.
        if !seen_keys.insert(row.idempotency_key.clone()) {
            summary.duplicates_skipped += 1;
            continue;
        }

        sequences
            .entry(row.recipe_id.clone())
            .or_default()
            .insert(row.ingredient_line_number);

        summary.accepted += 1;
        let record = pipeline.process(&row);
        tally(&mut summary, &record);

        serde_json::to_writer(&mut *output, &record)?;
        output
            .write_all(b"\n")
            .map_err(|e| LadleError::io("<output>", e))?;
    }

    for (recipe_id, lines) in &sequences {
        let Some(&max) = lines.iter().next_back() else {
            continue;
        };
        let missing: Vec<u32> = (1..=max).filter(|n| !lines.contains(n)).collect();
        if !missing.is_empty() {
            *summary
                .warning_counts
                .entry("SEQUENCE_GAP".to_string())
                .or_insert(0) += 1;
            summary.sequence_gaps.push(SequenceGap {
                recipe_id: recipe_id.clone(),
                missing,
            });
        }
    }
    summary.sequence_gaps.sort_by(|a, b| a.recipe_id.cmp(&b.recipe_id));

    Ok(summary)
}

fn tally(summary: &mut BatchSummary, record: &CanonicalRecord) {
    for w in &record.qty_parse_warnings {
        bump(summary, w);
    }
    for w in &record.package_parse_warnings {
        bump(summary, w);
    }
    for w in &record.form_warnings {
        bump(summary, w);
    }
    for w in &record.bridge_warnings {
        bump(summary, w);
    }
    if record.flag_nonstandard_unit {
        *summary
            .warning_counts
            .entry("NONSTANDARD_UNIT".to_string())
            .or_insert(0) += 1;
    }

    if record.is_converted() {
        summary.converted += 1;
        return;
    }
    summary.unconverted += 1;

    if let Some((code, detail)) = classify_failure(record) {
        summary.failures.push(RowFailure {
            recipe_id: record.recipe_id.clone(),
            ingredient_line_number: record.ingredient_line_number,
            ingredient_original_text: record.ingredient_original_text.clone(),
            code,
            detail,
        });
    }
}

fn bump<W: Serialize>(summary: &mut BatchSummary, warning: &W) {
    let code = serde_json::to_value(warning)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "UNKNOWN".to_string());
    *summary.warning_counts.entry(code).or_insert(0) += 1;
}

/// Map an unconverted record to its primary failure code.
fn classify_failure(record: &CanonicalRecord) -> Option<(String, Option<String>)> {
    match record.link_method {
        LinkMethod::Unresolved => {
            let code = match record.link_reason {
                Some(LinkReason::MultiIngredientLine) => "MULTI_INGREDIENT_LINE",
                _ => "NO_MATCH",
            };
            return Some((code.to_string(), None));
        }
        LinkMethod::Review => {
            let detail = record
                .link_candidates
                .iter()
                .map(|c| format!("{} ({:.2})", c.primary_name, c.score))
                .collect::<Vec<_>>()
                .join(", ");
            return Some(("LOW_CONFIDENCE".to_string(), Some(detail)));
        }
        _ => {}
    }

    if record.bridge_selection_path == Some(BridgeSelectionPath::H0NoDensity) {
        let detail = record.resolved_form_id.as_ref().map(|form| {
            format!(
                "needs density for ({}, {form})",
                record.ingredient_id.as_deref().unwrap_or("?")
            )
        });
        return Some(("H0_NO_DENSITY".to_string(), detail));
    }
    if record.bridge_warnings.contains(&BridgeWarning::SanityRangeEdge) {
        return Some((
            "SANITY_RANGE_EDGE".to_string(),
            record.density_g_per_ml.map(|d| format!("{d} g/mL")),
        ));
    }
    if record
        .qty_parse_warnings
        .contains(&QtyWarning::NoNumericQuantity)
    {
        return Some(("NO_NUMERIC_QUANTITY".to_string(), None));
    }

    // Special units and value-less rows end here: null numbers by design,
    // nothing actionable to report.
    None
}
