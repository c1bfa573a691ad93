//! Explain command - trace one line through the pipeline stage by stage.

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use ladle::pipeline::intake;
use ladle::{IntakeOutcome, Pipeline, RawRow, ReferenceSnapshot};
use serde_json::json;

pub fn run(
    reference: PathBuf,
    text: String,
    qty: Option<String>,
    unit: Option<String>,
    modifiers: Option<String>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = Arc::new(ReferenceSnapshot::load(&reference)?);
    let pipeline = Pipeline::new(snapshot);

    let raw = RawRow {
        recipe_id: Some(json!("adhoc")),
        ingredient_line_number: Some(json!(1)),
        ingredient_original_text: Some(json!(text)),
        qty_value_original: qty,
        unit_original: unit,
        modifiers_raw: modifiers,
        ..Default::default()
    };

    let row = match intake::validate(&raw) {
        IntakeOutcome::Accepted(row) => row,
        IntakeOutcome::Rejected(rejection) => {
            println!(
                "{} {:?}: {}",
                "Rejected at intake".red().bold(),
                rejection.code,
                rejection.detail
            );
            return Ok(());
        }
    };

    let record = pipeline.process(&row);

    let shown = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    println!("{}", "Quantity".yellow().bold());
    println!(
        "  min={} max={} range={} approx={} precision={}",
        shown(record.qty_min.map(|v| v.to_string())),
        shown(record.qty_max.map(|v| v.to_string())),
        record.qty_is_range,
        record.qty_approx_flag,
        shown(record.qty_precision_code.map(|p| format!("{p:?}")))
    );

    println!("{}", "Unit".yellow().bold());
    println!(
        "  enum={} dimension={} nonstandard={}",
        shown(record.unit_enum.map(|u| format!("{u:?}"))),
        shown(record.original_dimension.map(|d| format!("{d:?}"))),
        record.flag_nonstandard_unit
    );

    println!("{}", "Link".yellow().bold());
    println!(
        "  ingredient={} ({}) method={:?} confidence={:.2}",
        shown(record.ingredient_id.clone()),
        shown(record.ingredient_canonical_name.clone()),
        record.link_method,
        record.link_confidence
    );
    for candidate in &record.link_candidates {
        println!(
            "    candidate: {} {} ({:.2})",
            candidate.ingredient_id, candidate.primary_name, candidate.score
        );
    }

    println!("{}", "Form".yellow().bold());
    println!(
        "  form={} source={} conflict={}",
        shown(record.resolved_form_id.clone()),
        shown(record.form_source.map(|s| format!("{s:?}"))),
        record.form_conflict_flag
    );

    println!("{}", "Canonical".yellow().bold());
    println!(
        "  unit={} bridge={:?} ready={} path={} density={}",
        shown(record.canonical_unit.map(|u| format!("{u:?}"))),
        record.bridge_required,
        record.bridge_inputs_ready,
        shown(record.bridge_selection_path.map(|p| format!("{p:?}"))),
        shown(record.density_g_per_ml.map(|d| format!("{d} g/mL")))
    );
    println!(
        "  qty={} [{} .. {}] via {}",
        shown(record.canonical_qty.map(|v| v.to_string())).white().bold(),
        shown(record.canonical_qty_min.map(|v| v.to_string())),
        shown(record.canonical_qty_max.map(|v| v.to_string())),
        shown(record.conversion_path.map(|p| format!("{p:?}")))
    );

    if verbose {
        println!();
        println!("{}", serde_json::to_string_pretty(&record)?);
    }

    Ok(())
}
