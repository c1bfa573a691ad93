//! The canonical output record, accumulated stage by stage.

use serde::{Deserialize, Serialize};

use super::enums::{
    BridgeRequirement, BridgeSelectionPath, BridgeWarning, CanonicalUnit, ConversionPath,
    Dimension, FormSource, FormWarning, LinkMethod, LinkReason, PackageSizeUnit, PackageWarning,
    QtyPrecision, QtyWarning, SiUnit, UnitEnum,
};
use super::row::CleanRow;

/// A candidate surfaced for human review when fuzzy matching is inconclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkCandidate {
    pub ingredient_id: String,
    pub primary_name: String,
    pub score: f64,
}

/// The full Stage-2 output record.
///
/// Created by intake with identity fields, then monotonically augmented: each
/// pipeline stage owns one block of fields and writes it exactly once. Absent
/// values serialize as explicit `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalRecord {
    // Identity & provenance
    pub recipe_id: String,
    pub ingredient_line_number: u32,
    pub ingredient_original_text: String,
    pub idempotency_key: String,
    pub line_hash: Option<String>,
    pub qty_value_original: Option<String>,
    pub unit_original: Option<String>,
    pub package_size_raw: Option<String>,
    pub form_hint_raw: Option<String>,
    pub modifiers_raw: Option<String>,
    pub size_descriptor_raw: Option<String>,

    // Parsed quantity
    pub qty_min: Option<f64>,
    pub qty_max: Option<f64>,
    pub qty_is_range: bool,
    pub qty_approx_flag: bool,
    pub qty_precision_code: Option<QtyPrecision>,
    pub qty_parse_warnings: Vec<QtyWarning>,

    // Normalized unit
    pub unit_enum: Option<UnitEnum>,
    pub original_dimension: Option<Dimension>,
    pub flag_nonstandard_unit: bool,

    // Package metadata (never enters canonical arithmetic)
    pub package_multiplier: f64,
    pub package_size_value: Option<f64>,
    pub package_size_unit: Option<PackageSizeUnit>,
    pub package_size_si_value: Option<f64>,
    pub package_size_si_unit: Option<SiUnit>,
    pub package_parse_warnings: Vec<PackageWarning>,

    // Ingredient link
    pub ingredient_id: Option<String>,
    pub ingredient_canonical_name: Option<String>,
    pub link_confidence: f64,
    pub link_method: LinkMethod,
    pub link_reason: Option<LinkReason>,
    pub link_candidates: Vec<LinkCandidate>,

    // Form
    pub resolved_form_id: Option<String>,
    pub form_source: Option<FormSource>,
    pub form_conflict_flag: bool,
    pub form_warnings: Vec<FormWarning>,
    pub form_notes: Option<String>,

    // Canonical dimension
    pub canonical_unit: Option<CanonicalUnit>,
    pub canonical_dimension_selected: Option<Dimension>,
    pub bridge_required: BridgeRequirement,
    pub bridge_inputs_ready: bool,
    pub display_rule_default: Option<String>,

    // Density bridge
    pub density_id: Option<String>,
    pub density_g_per_ml: Option<f64>,
    pub bridge_selection_path: Option<BridgeSelectionPath>,
    pub bridge_warnings: Vec<BridgeWarning>,
    pub flag_needs_density_lookup: bool,

    // Converted values
    pub canonical_qty_min: Option<f64>,
    pub canonical_qty_max: Option<f64>,
    pub canonical_qty: Option<f64>,
    pub conversion_path: Option<ConversionPath>,
    pub conversion_notes: Option<String>,
}

impl CanonicalRecord {
    /// Seed a record from a validated row. Every non-identity block starts at
    /// its documented default.
    pub fn from_row(row: &CleanRow) -> Self {
        Self {
            recipe_id: row.recipe_id.clone(),
            ingredient_line_number: row.ingredient_line_number,
            ingredient_original_text: row.ingredient_original_text.clone(),
            idempotency_key: row.idempotency_key.clone(),
            line_hash: row.line_hash.clone(),
            qty_value_original: row.qty_value_original.clone(),
            unit_original: row.unit_original.clone(),
            package_size_raw: row.package_size_raw.clone(),
            form_hint_raw: row.form_hint_raw.clone(),
            modifiers_raw: row.modifiers_raw.clone(),
            size_descriptor_raw: row.size_descriptor_raw.clone(),

            qty_min: None,
            qty_max: None,
            qty_is_range: false,
            qty_approx_flag: false,
            qty_precision_code: None,
            qty_parse_warnings: Vec::new(),

            unit_enum: None,
            original_dimension: None,
            flag_nonstandard_unit: false,

            package_multiplier: 1.0,
            package_size_value: None,
            package_size_unit: None,
            package_size_si_value: None,
            package_size_si_unit: None,
            package_parse_warnings: Vec::new(),

            ingredient_id: None,
            ingredient_canonical_name: None,
            link_confidence: 0.0,
            link_method: LinkMethod::Unresolved,
            link_reason: None,
            link_candidates: Vec::new(),

            resolved_form_id: None,
            form_source: None,
            form_conflict_flag: false,
            form_warnings: Vec::new(),
            form_notes: None,

            canonical_unit: None,
            canonical_dimension_selected: None,
            bridge_required: BridgeRequirement::None,
            bridge_inputs_ready: false,
            display_rule_default: None,

            density_id: None,
            density_g_per_ml: None,
            bridge_selection_path: None,
            bridge_warnings: Vec::new(),
            flag_needs_density_lookup: false,

            canonical_qty_min: None,
            canonical_qty_max: None,
            canonical_qty: None,
            conversion_path: None,
            conversion_notes: None,
        }
    }

    /// True when the record produced usable canonical numbers.
    pub fn is_converted(&self) -> bool {
        self.canonical_qty.is_some()
    }
}
