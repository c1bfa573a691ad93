//! Form-table entity.

use serde::{Deserialize, Serialize};

use crate::record::TargetDimension;

/// A physical presentation of an ingredient (whole, chopped, ground, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Form {
    /// Stable identifier, e.g. `FORM_GROUND`.
    pub form_id: String,
    /// Display name.
    pub name: String,
    /// Optional group of interchangeable forms for density fallback.
    pub form_group: Option<String>,
    /// Preferred canonical dimension; `auto` preserves the original.
    pub target_dimension: TargetDimension,
    /// Display hint copied through to downstream consumers.
    pub display_rule_default: Option<String>,
}
