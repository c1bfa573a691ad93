//! Unit normalization: free-text unit tokens to the closed [`UnitEnum`].

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::{Dimension, UnitEnum};

/// Normalized unit block.
#[derive(Debug, Clone, Default)]
pub struct UnitNorm {
    pub unit_enum: Option<UnitEnum>,
    pub original_dimension: Option<Dimension>,
    pub flag_nonstandard_unit: bool,
}

/// Fluid ounce must win over mass ounce, so it is matched before the synonym
/// table is consulted.
static FLUID_OUNCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^fl\.?\s*oz\.?$|^fluid\s+ounces?$").expect("fluid ounce regex")
});

static SYNONYMS: Lazy<HashMap<&'static str, UnitEnum>> = Lazy::new(|| {
    use UnitEnum::*;
    let entries: &[(&str, UnitEnum)] = &[
        // Mass
        ("g", G),
        ("gram", G),
        ("grams", G),
        ("kg", Kg),
        ("kilogram", Kg),
        ("kilograms", Kg),
        ("mg", Mg),
        ("milligram", Mg),
        ("milligrams", Mg),
        ("oz", Oz),
        ("ounce", Oz),
        ("ounces", Oz),
        ("lb", Lb),
        ("lbs", Lb),
        ("pound", Lb),
        ("pounds", Lb),
        // Volume
        ("ml", Ml),
        ("milliliter", Ml),
        ("milliliters", Ml),
        ("millilitre", Ml),
        ("millilitres", Ml),
        ("l", L),
        ("liter", L),
        ("liters", L),
        ("litre", L),
        ("litres", L),
        ("tsp", Tsp),
        ("teaspoon", Tsp),
        ("teaspoons", Tsp),
        ("tbsp", Tbsp),
        ("tablespoon", Tbsp),
        ("tablespoons", Tbsp),
        ("tbl", Tbsp),
        ("tbs", Tbsp),
        ("cup", Cup),
        ("cups", Cup),
        ("c", Cup),
        ("fl oz", Floz),
        ("fluid ounce", Floz),
        ("fluid ounces", Floz),
        ("pt", Pint),
        ("pint", Pint),
        ("pints", Pint),
        ("qt", Quart),
        ("quart", Quart),
        ("quarts", Quart),
        ("gal", Gallon),
        ("gallon", Gallon),
        ("gallons", Gallon),
        // Count
        ("each", Ea),
        ("ea", Ea),
        ("piece", Piece),
        ("pieces", Piece),
        ("clove", Clove),
        ("cloves", Clove),
        ("egg", Egg),
        ("eggs", Egg),
        ("leaf", Leaf),
        ("leaves", Leaf),
        ("sprig", Sprig),
        ("sprigs", Sprig),
        ("stalk", Stalk),
        ("stalks", Stalk),
        ("head", Head),
        ("heads", Head),
        ("ear", Ear),
        ("ears", Ear),
        ("slice", Slice),
        ("slices", Slice),
        ("bunch", Bunch),
        ("bunches", Bunch),
        ("can", Can),
        ("cans", Can),
        ("jar", Jar),
        ("jars", Jar),
        ("bottle", Bottle),
        ("bottles", Bottle),
        ("package", Package),
        ("pkg", Package),
        ("pack", Package),
        ("packet", Package),
        ("stick", Stick),
        ("sticks", Stick),
        // Specials
        ("to taste", ToTaste),
        ("as needed", AsNeeded),
        ("pinch", Pinch),
        ("dash", Dash),
        ("handful", Handful),
        ("splash", Splash),
        ("drizzle", Drizzle),
    ];
    entries.iter().copied().collect()
});

/// Normalize a unit token.
///
/// `has_quantity` drives the empty-unit default: a bare numeric quantity
/// counts things, so an absent unit becomes `EA`.
pub fn normalize_unit(unit: Option<&str>, has_quantity: bool) -> UnitNorm {
    let token = unit.map(str::trim).unwrap_or("");
    if token.is_empty() {
        if has_quantity {
            return UnitNorm {
                unit_enum: Some(UnitEnum::Ea),
                original_dimension: Some(Dimension::Count),
                flag_nonstandard_unit: false,
            };
        }
        return UnitNorm::default();
    }

    let mut normalized = token.to_lowercase();
    while normalized.ends_with('.') {
        normalized.pop();
    }
    let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");

    if FLUID_OUNCE.is_match(&normalized) {
        return found(UnitEnum::Floz);
    }

    if let Some(&unit) = SYNONYMS.get(normalized.as_str()) {
        return found(unit);
    }

    // Singular fallback for simple plurals the table does not list.
    if normalized.ends_with('s') && normalized.len() > 2 {
        if let Some(&unit) = SYNONYMS.get(&normalized[..normalized.len() - 1]) {
            return found(unit);
        }
    }

    UnitNorm {
        unit_enum: None,
        original_dimension: None,
        flag_nonstandard_unit: true,
    }
}

fn found(unit: UnitEnum) -> UnitNorm {
    UnitNorm {
        unit_enum: Some(unit),
        original_dimension: Some(unit.dimension()),
        flag_nonstandard_unit: false,
    }
}
