//! Final deterministic conversion to canonical SI values.

use crate::record::{BridgeRequirement, CanonicalUnit, ConversionPath, UnitEnum};
use crate::reference::units;

/// Converted-values block.
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    pub canonical_qty_min: Option<f64>,
    pub canonical_qty_max: Option<f64>,
    pub canonical_qty: Option<f64>,
    pub conversion_path: Option<ConversionPath>,
    pub conversion_notes: Option<String>,
}

/// Residue below this is floating-point noise and snaps to the integer.
const SNAP_EPSILON: f64 = 1e-9;

fn snap(x: f64) -> f64 {
    let rounded = x.round();
    if (x - rounded).abs() < SNAP_EPSILON {
        rounded
    } else {
        x
    }
}

/// Convert `qty_min`/`qty_max` to the canonical unit.
///
/// Dispatch is on `(canonical_unit, bridge_required)`; min and max convert
/// independently and the midpoint lands in `canonical_qty`. A missing
/// required density returns without canonical numbers, leaving the earlier
/// `bridge_inputs_ready = false` in force.
pub fn convert(
    qty_min: Option<f64>,
    qty_max: Option<f64>,
    unit_enum: Option<UnitEnum>,
    canonical_unit: Option<CanonicalUnit>,
    bridge_required: BridgeRequirement,
    density_g_per_ml: Option<f64>,
) -> Conversion {
    let mut result = Conversion::default();

    let (min, max) = match (qty_min, qty_max) {
        (Some(min), Some(max)) => (min, max),
        _ => {
            result.conversion_notes = Some("missing_quantity".to_string());
            return result;
        }
    };

    let canonical_unit = match canonical_unit {
        Some(u) => u,
        None => return result,
    };

    if canonical_unit == CanonicalUnit::Each {
        return emit(result, min, max, ConversionPath::Count);
    }

    let unit = match unit_enum {
        Some(u) => u,
        None => {
            result.conversion_notes = Some("missing_unit".to_string());
            return result;
        }
    };

    match (canonical_unit, bridge_required) {
        (CanonicalUnit::Grams, BridgeRequirement::None) => match units::mass_to_g(unit) {
            Some(factor) => emit(result, min * factor, max * factor, ConversionPath::MassToMass),
            None => note(result, format!("unknown_mass_unit:{unit:?}")),
        },
        (CanonicalUnit::Milliliters, BridgeRequirement::None) => match units::volume_to_ml(unit) {
            Some(factor) => emit(result, min * factor, max * factor, ConversionPath::VolToVol),
            None => note(result, format!("unknown_volume_unit:{unit:?}")),
        },
        (CanonicalUnit::Grams, BridgeRequirement::VolToMass) => {
            let density = match density_g_per_ml {
                Some(d) if d > 0.0 => d,
                _ => return note(result, "missing_density".to_string()),
            };
            match units::volume_to_ml(unit) {
                Some(factor) => emit(
                    result,
                    min * factor * density,
                    max * factor * density,
                    ConversionPath::VolToMassViaDensity,
                ),
                None => note(result, format!("unknown_volume_unit:{unit:?}")),
            }
        }
        (CanonicalUnit::Milliliters, BridgeRequirement::MassToVol) => {
            let density = match density_g_per_ml {
                Some(d) if d > 0.0 => d,
                _ => return note(result, "missing_density".to_string()),
            };
            match units::mass_to_g(unit) {
                Some(factor) => emit(
                    result,
                    min * factor / density,
                    max * factor / density,
                    ConversionPath::MassToVolViaDensity,
                ),
                None => note(result, format!("unknown_mass_unit:{unit:?}")),
            }
        }
        _ => note(result, "conversion_path_unknown".to_string()),
    }
}

fn emit(mut result: Conversion, min: f64, max: f64, path: ConversionPath) -> Conversion {
    let min = snap(min);
    let max = snap(max);
    result.canonical_qty_min = Some(min);
    result.canonical_qty_max = Some(max);
    result.canonical_qty = Some(snap((min + max) / 2.0));
    result.conversion_path = Some(path);
    result
}

fn note(mut result: Conversion, message: String) -> Conversion {
    result.conversion_notes = Some(message);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_passthrough() {
        let c = convert(
            Some(2.0),
            Some(2.0),
            Some(UnitEnum::Egg),
            Some(CanonicalUnit::Each),
            BridgeRequirement::None,
            None,
        );
        assert_eq!(c.canonical_qty, Some(2.0));
        assert_eq!(c.conversion_path, Some(ConversionPath::Count));
    }

    #[test]
    fn mass_to_mass() {
        let c = convert(
            Some(0.5),
            Some(0.5),
            Some(UnitEnum::Lb),
            Some(CanonicalUnit::Grams),
            BridgeRequirement::None,
            None,
        );
        assert_eq!(c.canonical_qty, Some(226.796185));
        assert_eq!(c.conversion_path, Some(ConversionPath::MassToMass));
    }

    #[test]
    fn vol_to_vol() {
        let c = convert(
            Some(0.5),
            Some(0.5),
            Some(UnitEnum::Cup),
            Some(CanonicalUnit::Milliliters),
            BridgeRequirement::None,
            None,
        );
        assert_eq!(c.canonical_qty, Some(118.29411825));
        assert_eq!(c.conversion_path, Some(ConversionPath::VolToVol));
    }

    #[test]
    fn vol_to_mass_via_density() {
        let c = convert(
            Some(1.0),
            Some(1.0),
            Some(UnitEnum::Cup),
            Some(CanonicalUnit::Grams),
            BridgeRequirement::VolToMass,
            Some(0.528),
        );
        let expected = 236.5882365 * 0.528;
        assert!((c.canonical_qty.unwrap() - expected).abs() < 1e-9);
        assert_eq!(c.conversion_path, Some(ConversionPath::VolToMassViaDensity));
    }

    #[test]
    fn mass_to_vol_via_density() {
        let c = convert(
            Some(100.0),
            Some(100.0),
            Some(UnitEnum::G),
            Some(CanonicalUnit::Milliliters),
            BridgeRequirement::MassToVol,
            Some(0.8),
        );
        assert_eq!(c.canonical_qty, Some(125.0));
        assert_eq!(c.conversion_path, Some(ConversionPath::MassToVolViaDensity));
    }

    #[test]
    fn range_converts_both_ends_and_midpoints() {
        let c = convert(
            Some(1.0),
            Some(2.0),
            Some(UnitEnum::Tsp),
            Some(CanonicalUnit::Milliliters),
            BridgeRequirement::None,
            None,
        );
        let min = c.canonical_qty_min.unwrap();
        let max = c.canonical_qty_max.unwrap();
        assert!((min - 4.92892159375).abs() < 1e-9);
        assert!((max - 9.8578431875).abs() < 1e-9);
        assert!((c.canonical_qty.unwrap() - (min + max) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn missing_density_writes_no_numbers() {
        let c = convert(
            Some(1.0),
            Some(1.0),
            Some(UnitEnum::Cup),
            Some(CanonicalUnit::Grams),
            BridgeRequirement::VolToMass,
            None,
        );
        assert!(c.canonical_qty.is_none());
        assert_eq!(c.conversion_notes.as_deref(), Some("missing_density"));
    }

    #[test]
    fn missing_quantity_writes_note() {
        let c = convert(
            None,
            None,
            Some(UnitEnum::Cup),
            Some(CanonicalUnit::Milliliters),
            BridgeRequirement::None,
            None,
        );
        assert!(c.canonical_qty.is_none());
        assert_eq!(c.conversion_notes.as_deref(), Some("missing_quantity"));
    }

    #[test]
    fn round_trip_recovers_original() {
        let density = 0.7301;
        let forward = convert(
            Some(3.25),
            Some(3.25),
            Some(UnitEnum::Cup),
            Some(CanonicalUnit::Grams),
            BridgeRequirement::VolToMass,
            Some(density),
        );
        let grams = forward.canonical_qty.unwrap();
        let back = grams / density / 236.5882365;
        assert!((back - 3.25).abs() < 1e-9);
    }

    #[test]
    fn snap_clears_residue() {
        assert_eq!(snap(2.0000000000004), 2.0);
        assert_eq!(snap(2.1), 2.1);
    }
}
