//! Ingredient master-table entity.

use serde::{Deserialize, Serialize};

/// One row of the ingredient master table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    /// Stable identifier, e.g. `INGR_01091`.
    pub ingredient_id: String,
    /// Canonical display name.
    pub primary_name: String,
    /// Alternative names pointing at this ingredient.
    pub aliases: Vec<String>,
    /// Coarse category (`spice`, `produce`, ...), used for category defaults
    /// and the unit-bias heuristic.
    pub category: Option<String>,
    /// Form assumed when no hint resolves.
    pub default_form_id: Option<String>,
    /// Per-ingredient token → form overrides, in declared precedence order.
    pub form_overrides: Vec<(String, String)>,
}

impl Ingredient {
    /// Override form for a hint token, if this ingredient declares one.
    pub fn override_for(&self, token: &str) -> Option<&str> {
        self.form_overrides
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, f)| f.as_str())
    }
}
