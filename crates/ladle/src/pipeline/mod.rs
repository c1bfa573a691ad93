//! The nine-stage canonicalization pipeline.
//!
//! [`Pipeline::process`] is pure per row: no shared mutable state, no
//! suspension points, bounded cost. A driver may run it from many worker
//! threads against one immutable [`ReferenceSnapshot`].

pub mod bridge;
pub mod convert;
pub mod dimension;
pub mod form;
pub mod intake;
pub mod linker;
pub mod package;
pub mod quantity;
pub mod unit;

use std::sync::Arc;

use chrono::NaiveDate;

use crate::record::{CanonicalRecord, CleanRow, LinkMethod};
use crate::reference::ReferenceSnapshot;

pub use intake::{IntakeOutcome, Rejection};

/// Run-level configuration.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Date at which density effective windows are evaluated. Pin it for
    /// byte-identical re-runs.
    pub today: NaiveDate,
    /// Plausibility band for chosen densities, in g/mL.
    pub density_band: (f64, f64),
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            today: chrono::Utc::now().date_naive(),
            density_band: (0.05, 2.0),
        }
    }
}

/// The per-row transformation engine.
pub struct Pipeline {
    snapshot: Arc<ReferenceSnapshot>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(snapshot: Arc<ReferenceSnapshot>) -> Self {
        Self::with_config(snapshot, PipelineConfig::default())
    }

    pub fn with_config(snapshot: Arc<ReferenceSnapshot>, config: PipelineConfig) -> Self {
        Self { snapshot, config }
    }

    pub fn snapshot(&self) -> &ReferenceSnapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one validated row through stages C2..C9.
    ///
    /// Every outcome is a record: failures terminate augmentation early with
    /// their classification set and canonical numbers left null.
    pub fn process(&self, row: &CleanRow) -> CanonicalRecord {
        let mut record = CanonicalRecord::from_row(row);

        // C2: quantity
        let qty = quantity::parse_quantity(row.qty_value_original.as_deref());
        let has_quantity = qty.qty_min.is_some();
        record.qty_min = qty.qty_min;
        record.qty_max = qty.qty_max;
        record.qty_is_range = qty.qty_is_range;
        record.qty_approx_flag = qty.qty_approx_flag;
        record.qty_precision_code = qty.qty_precision_code;
        record.qty_parse_warnings = qty.qty_parse_warnings;

        // C3: unit
        let unit = unit::normalize_unit(row.unit_original.as_deref(), has_quantity);
        record.unit_enum = unit.unit_enum;
        record.original_dimension = unit.original_dimension;
        record.flag_nonstandard_unit = unit.flag_nonstandard_unit;

        // C4: package (metadata only)
        let package = package::parse_package(
            row.package_size_raw.as_deref(),
            &row.ingredient_original_text,
        );
        record.package_multiplier = package.package_multiplier;
        record.package_size_value = package.package_size_value;
        record.package_size_unit = package.package_size_unit;
        record.package_size_si_value = package.package_size_si_value;
        record.package_size_si_unit = package.package_size_si_unit;
        record.package_parse_warnings = package.package_parse_warnings;

        // C5: ingredient link
        let link = linker::link(
            &self.snapshot,
            &row.ingredient_original_text,
            row.qty_value_original.as_deref(),
            row.unit_original.as_deref(),
        );
        record.ingredient_id = link.ingredient_id;
        record.ingredient_canonical_name = link.ingredient_canonical_name;
        record.link_confidence = link.link_confidence;
        record.link_method = link.link_method;
        record.link_reason = link.link_reason;
        record.link_candidates = link.link_candidates;

        let ingredient = match record
            .ingredient_id
            .as_deref()
            .and_then(|id| self.snapshot.ingredient(id))
        {
            Some(ing) => ing,
            // Unresolved or review: canonical numbers stay null.
            None => return record,
        };
        debug_assert!(!matches!(
            record.link_method,
            LinkMethod::Unresolved | LinkMethod::Review
        ));

        // C6: form
        let hint_texts = [
            row.form_hint_raw.as_deref(),
            row.modifiers_raw.as_deref(),
            Some(row.ingredient_original_text.as_str()),
        ];
        let form = form::resolve_form(
            &self.snapshot,
            ingredient,
            &hint_texts,
            record.original_dimension,
        );
        record.resolved_form_id = form.resolved_form_id;
        record.form_source = form.form_source;
        record.form_conflict_flag = form.form_conflict_flag;
        record.form_warnings = form.form_warnings;
        record.form_notes = form.form_notes;

        // C7: canonical dimension
        let resolved_form = record
            .resolved_form_id
            .as_deref()
            .and_then(|id| self.snapshot.form(id));
        let selection = dimension::select_dimension(record.original_dimension, resolved_form);
        record.canonical_unit = selection.canonical_unit;
        record.canonical_dimension_selected = selection.canonical_dimension_selected;
        record.bridge_required = selection.bridge_required;
        record.bridge_inputs_ready = selection.bridge_inputs_ready;
        record.display_rule_default = selection.display_rule_default;

        if record.canonical_unit.is_none() {
            // Special units (and unit-less rows) terminate before bridging.
            return record;
        }

        // C8: density bridge
        let packed_hint = bridge::detect_packed_hint(&[
            row.modifiers_raw.as_deref(),
            Some(row.ingredient_original_text.as_str()),
        ]);
        let lookup = bridge::lookup_density(
            &self.snapshot,
            &ingredient.ingredient_id,
            record.resolved_form_id.as_deref(),
            record.bridge_required,
            packed_hint,
            self.config.today,
            self.config.density_band,
        );
        record.density_id = lookup.density_id;
        record.density_g_per_ml = lookup.density_g_per_ml;
        record.bridge_selection_path = lookup.bridge_selection_path;
        record.bridge_inputs_ready = lookup.bridge_inputs_ready;
        record.flag_needs_density_lookup = lookup.flag_needs_density_lookup;
        record.bridge_warnings = lookup.bridge_warnings;

        // C9: conversion
        if record.bridge_inputs_ready {
            let conversion = convert::convert(
                record.qty_min,
                record.qty_max,
                record.unit_enum,
                record.canonical_unit,
                record.bridge_required,
                record.density_g_per_ml,
            );
            record.canonical_qty_min = conversion.canonical_qty_min;
            record.canonical_qty_max = conversion.canonical_qty_max;
            record.canonical_qty = conversion.canonical_qty;
            record.conversion_path = conversion.conversion_path;
            record.conversion_notes = conversion.conversion_notes;
        }

        record
    }
}
