//! Canonical dimension selection: decide `g`/`mL`/`ea` and whether a
//! mass↔volume bridge is needed.

use crate::record::{BridgeRequirement, CanonicalUnit, Dimension, TargetDimension};
use crate::reference::Form;

/// Dimension-selection block.
#[derive(Debug, Clone)]
pub struct DimensionSelection {
    pub canonical_unit: Option<CanonicalUnit>,
    pub canonical_dimension_selected: Option<Dimension>,
    pub bridge_required: BridgeRequirement,
    /// Preliminary readiness; the density bridge refines it.
    pub bridge_inputs_ready: bool,
    pub display_rule_default: Option<String>,
}

impl Default for DimensionSelection {
    fn default() -> Self {
        Self {
            canonical_unit: None,
            canonical_dimension_selected: None,
            bridge_required: BridgeRequirement::None,
            bridge_inputs_ready: false,
            display_rule_default: None,
        }
    }
}

/// Apply the decision table.
///
/// Counts never convert; specials terminate before conversion; an unresolved
/// form preserves the original dimension with no bridge.
pub fn select_dimension(
    original_dimension: Option<Dimension>,
    form: Option<&Form>,
) -> DimensionSelection {
    let display_rule_default = form.and_then(|f| f.display_rule_default.clone());

    let original = match original_dimension {
        None | Some(Dimension::Special) => {
            return DimensionSelection {
                display_rule_default,
                ..DimensionSelection::default()
            }
        }
        Some(Dimension::Count) => {
            return DimensionSelection {
                canonical_unit: Some(CanonicalUnit::Each),
                canonical_dimension_selected: Some(Dimension::Count),
                bridge_required: BridgeRequirement::None,
                bridge_inputs_ready: true,
                display_rule_default,
            }
        }
        Some(d) => d,
    };

    let target = form.map(|f| f.target_dimension).unwrap_or(TargetDimension::Auto);
    let (unit, selected, bridge) = match (original, target) {
        (Dimension::Mass, TargetDimension::Mass | TargetDimension::Auto) => {
            (CanonicalUnit::Grams, Dimension::Mass, BridgeRequirement::None)
        }
        (Dimension::Volume, TargetDimension::Volume | TargetDimension::Auto) => (
            CanonicalUnit::Milliliters,
            Dimension::Volume,
            BridgeRequirement::None,
        ),
        (Dimension::Mass, TargetDimension::Volume) => (
            CanonicalUnit::Milliliters,
            Dimension::Volume,
            BridgeRequirement::MassToVol,
        ),
        (Dimension::Volume, TargetDimension::Mass) => (
            CanonicalUnit::Grams,
            Dimension::Mass,
            BridgeRequirement::VolToMass,
        ),
        // Count/special handled above.
        _ => unreachable!("count and special dimensions return early"),
    };

    DimensionSelection {
        canonical_unit: Some(unit),
        canonical_dimension_selected: Some(selected),
        bridge_required: bridge,
        bridge_inputs_ready: bridge == BridgeRequirement::None,
        display_rule_default,
    }
}
