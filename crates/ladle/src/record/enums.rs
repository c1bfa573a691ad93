//! Closed enums of the external contract.
//!
//! Serialized representations are bit-exact: downstream consumers match on
//! the strings, so renames here are breaking changes.

use serde::{Deserialize, Serialize};

/// Canonical unit codes after synonym normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitEnum {
    // Mass
    Mg,
    G,
    Kg,
    Oz,
    Lb,
    // Volume
    Tsp,
    Tbsp,
    Floz,
    Cup,
    Pint,
    Quart,
    Gallon,
    Ml,
    L,
    // Count
    Ea,
    Egg,
    Clove,
    Slice,
    Piece,
    Leaf,
    Sprig,
    Stalk,
    Head,
    Ear,
    Bunch,
    Can,
    Jar,
    Bottle,
    Package,
    Stick,
    // Special (no SI conversion)
    ToTaste,
    AsNeeded,
    Pinch,
    Dash,
    Handful,
    Splash,
    Drizzle,
}

impl UnitEnum {
    /// Dimension bucket the unit belongs to.
    pub fn dimension(&self) -> Dimension {
        use UnitEnum::*;
        match self {
            Mg | G | Kg | Oz | Lb => Dimension::Mass,
            Tsp | Tbsp | Floz | Cup | Pint | Quart | Gallon | Ml | L => Dimension::Volume,
            Ea | Egg | Clove | Slice | Piece | Leaf | Sprig | Stalk | Head | Ear | Bunch | Can
            | Jar | Bottle | Package | Stick => Dimension::Count,
            ToTaste | AsNeeded | Pinch | Dash | Handful | Splash | Drizzle => Dimension::Special,
        }
    }
}

/// Physical dimension of the original unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Mass,
    Volume,
    Count,
    Special,
}

/// Canonical storage unit for the converted quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalUnit {
    #[serde(rename = "g")]
    Grams,
    #[serde(rename = "mL")]
    Milliliters,
    #[serde(rename = "ea")]
    Each,
}

/// Whether a mass↔volume bridge is needed to reach the canonical unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BridgeRequirement {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "vol→mass")]
    VolToMass,
    #[serde(rename = "mass→vol")]
    MassToVol,
}

/// The arithmetic path taken by the final conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConversionPath {
    #[serde(rename = "count")]
    Count,
    #[serde(rename = "mass→mass")]
    MassToMass,
    #[serde(rename = "vol→vol")]
    VolToVol,
    #[serde(rename = "vol→mass via density")]
    VolToMassViaDensity,
    #[serde(rename = "mass→vol via density")]
    MassToVolViaDensity,
}

/// Which fallback tier produced the chosen density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BridgeSelectionPath {
    #[serde(rename = "H0_NO_DENSITY")]
    H0NoDensity,
    #[serde(rename = "H1_EXACT_FORM_PACKED")]
    H1ExactFormPacked,
    #[serde(rename = "H2_EXACT_FORM")]
    H2ExactForm,
    #[serde(rename = "H3_FORM_GROUP")]
    H3FormGroup,
    #[serde(rename = "H4_DEFAULT_FORM")]
    H4DefaultForm,
    #[serde(rename = "H5_ANY_FORM")]
    H5AnyForm,
}

/// How the ingredient link was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMethod {
    Exact,
    Alias,
    Normalized,
    Fuzzy,
    Review,
    Unresolved,
}

/// Reason attached to `review`/`unresolved` link outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkReason {
    NoMatch,
    MultiIngredientLine,
    LowConfidence,
}

/// Which precedence tier resolved the physical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormSource {
    Alias,
    Explicit,
    UnitBias,
    Default,
    CategoryDefault,
}

/// Non-fatal form-resolution outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormWarning {
    NoFormMatch,
}

/// Lexical shape of the parsed quantity token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QtyPrecision {
    Integer,
    Decimal,
    Fraction,
    Mixed,
    Range,
    Text,
}

/// Non-fatal quantity-parse warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QtyWarning {
    QtyRangeSideInvalid,
    MultipleRangeSeparators,
    NoNumericQuantity,
    TextNumberFallback,
}

/// Non-fatal package-parse warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageWarning {
    NoPackageSizeFound,
    MultiplierFound,
    AmbiguousOzLiquid,
}

/// Units accepted in package-size text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageSizeUnit {
    Oz,
    Floz,
    G,
    Kg,
    Ml,
    L,
}

/// SI mirror unit for package sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SiUnit {
    G,
    Ml,
}

/// Density-bridge warnings. `SANITY_RANGE_EDGE` blocks conversion; the other
/// two are informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BridgeWarning {
    SanityRangeEdge,
    PackedStateMismatch,
    TempMismatch,
}

/// Packed-state of a granular measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackedState {
    Packed,
    LooselyPacked,
}

/// Target dimension declared on a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetDimension {
    #[serde(rename = "g")]
    Mass,
    #[serde(rename = "mL")]
    Volume,
    #[serde(rename = "auto")]
    Auto,
}

/// Intake rejection codes. Rejected rows are logged, never processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectCode {
    MissingRequiredField,
    TypeMismatch,
    SectionHeaderRow,
    UnitInvalidFormat,
}

impl RejectCode {
    /// Human-readable label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            RejectCode::MissingRequiredField => "Missing Required Field",
            RejectCode::TypeMismatch => "Type Mismatch",
            RejectCode::SectionHeaderRow => "Section Header Row",
            RejectCode::UnitInvalidFormat => "Invalid Unit Format",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_strings_are_exact() {
        assert_eq!(
            serde_json::to_string(&CanonicalUnit::Milliliters).unwrap(),
            "\"mL\""
        );
        assert_eq!(
            serde_json::to_string(&BridgeRequirement::VolToMass).unwrap(),
            "\"vol→mass\""
        );
        assert_eq!(
            serde_json::to_string(&ConversionPath::MassToVolViaDensity).unwrap(),
            "\"mass→vol via density\""
        );
        assert_eq!(
            serde_json::to_string(&BridgeSelectionPath::H1ExactFormPacked).unwrap(),
            "\"H1_EXACT_FORM_PACKED\""
        );
        assert_eq!(
            serde_json::to_string(&FormSource::UnitBias).unwrap(),
            "\"unit_bias\""
        );
        assert_eq!(serde_json::to_string(&UnitEnum::ToTaste).unwrap(), "\"TO_TASTE\"");
        assert_eq!(serde_json::to_string(&QtyPrecision::Mixed).unwrap(), "\"mixed\"");
    }

    #[test]
    fn unit_dimensions_bucket_correctly() {
        assert_eq!(UnitEnum::Kg.dimension(), Dimension::Mass);
        assert_eq!(UnitEnum::Cup.dimension(), Dimension::Volume);
        assert_eq!(UnitEnum::Clove.dimension(), Dimension::Count);
        assert_eq!(UnitEnum::Pinch.dimension(), Dimension::Special);
    }
}
