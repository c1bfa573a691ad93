//! Input rows: the loose wire shape and the validated intake output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A Stage-1 row as it arrives on the wire.
///
/// The three required fields are kept as raw JSON values so intake can
/// classify a rejection (`MISSING_REQUIRED_FIELD` vs `TYPE_MISMATCH`) instead
/// of failing wholesale in serde.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRow {
    #[serde(default)]
    pub recipe_id: Option<Value>,
    #[serde(default)]
    pub ingredient_line_number: Option<Value>,
    #[serde(default)]
    pub ingredient_original_text: Option<Value>,

    #[serde(default)]
    pub qty_value_original: Option<String>,
    #[serde(default)]
    pub unit_original: Option<String>,
    #[serde(default)]
    pub package_size_raw: Option<String>,
    #[serde(default)]
    pub form_hint_raw: Option<String>,
    #[serde(default)]
    pub modifiers_raw: Option<String>,
    #[serde(default)]
    pub size_descriptor_raw: Option<String>,
    #[serde(default)]
    pub line_hash: Option<String>,
}

/// A row that passed intake validation.
///
/// All text fields are NFC-normalized, whitespace-collapsed, and `None` when
/// empty. The idempotency key is already computed.
#[derive(Debug, Clone, Serialize)]
pub struct CleanRow {
    pub recipe_id: String,
    pub ingredient_line_number: u32,
    pub ingredient_original_text: String,
    pub idempotency_key: String,

    pub qty_value_original: Option<String>,
    pub unit_original: Option<String>,
    pub package_size_raw: Option<String>,
    pub form_hint_raw: Option<String>,
    pub modifiers_raw: Option<String>,
    pub size_descriptor_raw: Option<String>,
    pub line_hash: Option<String>,
}
