//! Fixed unit-conversion constants.
//!
//! The exact decimals are part of the external contract; downstream consumers
//! reverse these conversions bit-for-bit.

use crate::record::UnitEnum;

pub const MG_TO_G: f64 = 0.001;
pub const KG_TO_G: f64 = 1000.0;
pub const OZ_TO_G: f64 = 28.349523125;
pub const LB_TO_G: f64 = 453.59237;

pub const TSP_TO_ML: f64 = 4.92892159375;
pub const TBSP_TO_ML: f64 = 14.78676478125;
pub const FLOZ_TO_ML: f64 = 29.5735295625;
pub const CUP_TO_ML: f64 = 236.5882365;
pub const PINT_TO_ML: f64 = 473.176473;
pub const QUART_TO_ML: f64 = 946.352946;
pub const GALLON_TO_ML: f64 = 3785.411784;
pub const L_TO_ML: f64 = 1000.0;

/// Grams per unit for mass units; `None` for anything else.
pub fn mass_to_g(unit: UnitEnum) -> Option<f64> {
    match unit {
        UnitEnum::Mg => Some(MG_TO_G),
        UnitEnum::G => Some(1.0),
        UnitEnum::Kg => Some(KG_TO_G),
        UnitEnum::Oz => Some(OZ_TO_G),
        UnitEnum::Lb => Some(LB_TO_G),
        _ => None,
    }
}

/// Millilitres per unit for volume units; `None` for anything else.
pub fn volume_to_ml(unit: UnitEnum) -> Option<f64> {
    match unit {
        UnitEnum::Tsp => Some(TSP_TO_ML),
        UnitEnum::Tbsp => Some(TBSP_TO_ML),
        UnitEnum::Floz => Some(FLOZ_TO_ML),
        UnitEnum::Cup => Some(CUP_TO_ML),
        UnitEnum::Pint => Some(PINT_TO_ML),
        UnitEnum::Quart => Some(QUART_TO_ML),
        UnitEnum::Gallon => Some(GALLON_TO_ML),
        UnitEnum::Ml => Some(1.0),
        UnitEnum::L => Some(L_TO_ML),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_constants() {
        assert_eq!(mass_to_g(UnitEnum::Oz), Some(28.349523125));
        assert_eq!(mass_to_g(UnitEnum::Lb), Some(453.59237));
        assert_eq!(volume_to_ml(UnitEnum::Cup), Some(236.5882365));
        assert_eq!(volume_to_ml(UnitEnum::Tsp), Some(4.92892159375));
    }

    #[test]
    fn cross_dimension_lookups_are_none() {
        assert_eq!(mass_to_g(UnitEnum::Cup), None);
        assert_eq!(volume_to_ml(UnitEnum::G), None);
        assert_eq!(mass_to_g(UnitEnum::Ea), None);
        assert_eq!(volume_to_ml(UnitEnum::Pinch), None);
    }
}
