//! Package & variant extraction: `N × V unit` and `V unit` patterns.
//!
//! Output is metadata for downstream consumers (grocery aggregation, display)
//! and never participates in canonical quantity arithmetic.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::{PackageSizeUnit, PackageWarning, SiUnit};
use crate::reference::units;

/// Parsed package block.
#[derive(Debug, Clone)]
pub struct PackageParse {
    pub package_multiplier: f64,
    pub package_size_value: Option<f64>,
    pub package_size_unit: Option<PackageSizeUnit>,
    pub package_size_si_value: Option<f64>,
    pub package_size_si_unit: Option<SiUnit>,
    pub package_parse_warnings: Vec<PackageWarning>,
}

impl Default for PackageParse {
    fn default() -> Self {
        Self {
            package_multiplier: 1.0,
            package_size_value: None,
            package_size_unit: None,
            package_size_si_value: None,
            package_size_si_unit: None,
            package_parse_warnings: Vec::new(),
        }
    }
}

const UNIT_ALTERNATION: &str = r"fl\.?\s*oz|oz|kg|g|ml|l";

static MULTIPLIER_X: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(\d+)\s*[x×]\s*(\d+(?:\.\d+)?)\s*-?\s*({UNIT_ALTERNATION})\b"
    ))
    .expect("multiplier x regex")
});
static MULTIPLIER_PAREN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(\d+)\s*\([^)]*?(\d+(?:\.\d+)?)\s*-?\s*({UNIT_ALTERNATION})\b[^)]*\)"
    ))
    .expect("multiplier paren regex")
});
static SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b(\d+(?:\.\d+)?)\s*-?\s*({UNIT_ALTERNATION})\b"))
        .expect("size regex")
});

/// Words suggesting the surrounding text describes a liquid, making a bare
/// `oz` ambiguous with `fl oz`.
const LIQUID_HINTS: &[&str] = &[
    "juice", "milk", "water", "oil", "broth", "stock", "sauce", "syrup", "cream", "liquid",
    "soda", "wine", "beer", "vinegar", "drink",
];

fn size_unit(token: &str) -> PackageSizeUnit {
    let t = token.to_lowercase();
    if t.contains("fl") {
        PackageSizeUnit::Floz
    } else if t.contains("oz") {
        PackageSizeUnit::Oz
    } else if t == "kg" {
        PackageSizeUnit::Kg
    } else if t == "g" {
        PackageSizeUnit::G
    } else if t == "ml" {
        PackageSizeUnit::Ml
    } else {
        PackageSizeUnit::L
    }
}

/// SI mirror of a package size.
fn si_mirror(value: f64, unit: PackageSizeUnit) -> (f64, SiUnit) {
    match unit {
        PackageSizeUnit::Oz => (value * units::OZ_TO_G, SiUnit::G),
        PackageSizeUnit::G => (value, SiUnit::G),
        PackageSizeUnit::Kg => (value * units::KG_TO_G, SiUnit::G),
        PackageSizeUnit::Floz => (value * units::FLOZ_TO_ML, SiUnit::Ml),
        PackageSizeUnit::Ml => (value, SiUnit::Ml),
        PackageSizeUnit::L => (value * units::L_TO_ML, SiUnit::Ml),
    }
}

/// Extract package information from the package text and the original line.
pub fn parse_package(package_size_raw: Option<&str>, original_text: &str) -> PackageParse {
    let mut result = PackageParse::default();

    let haystack = format!(
        "{} {}",
        package_size_raw.unwrap_or(""),
        original_text
    )
    .to_lowercase()
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ");

    // Multiplier patterns first; first match wins and also yields the size.
    let multiplier_caps = MULTIPLIER_X
        .captures(&haystack)
        .or_else(|| MULTIPLIER_PAREN.captures(&haystack));
    if let Some(caps) = multiplier_caps {
        if let (Ok(n), Ok(v)) = (caps[1].parse::<f64>(), caps[2].parse::<f64>()) {
            let unit = size_unit(&caps[3]);
            result.package_multiplier = n;
            result.package_parse_warnings.push(PackageWarning::MultiplierFound);
            set_size(&mut result, v, unit);
            check_ambiguous_oz(&mut result, unit, &haystack);
            return result;
        }
    }

    if let Some(caps) = SIZE.captures(&haystack) {
        if let Ok(v) = caps[1].parse::<f64>() {
            let unit = size_unit(&caps[2]);
            set_size(&mut result, v, unit);
            check_ambiguous_oz(&mut result, unit, &haystack);
            return result;
        }
    }

    if package_size_raw.map(|s| !s.trim().is_empty()).unwrap_or(false) {
        result
            .package_parse_warnings
            .push(PackageWarning::NoPackageSizeFound);
    }
    result
}

fn set_size(result: &mut PackageParse, value: f64, unit: PackageSizeUnit) {
    let (si_value, si_unit) = si_mirror(value, unit);
    result.package_size_value = Some(value);
    result.package_size_unit = Some(unit);
    result.package_size_si_value = Some(si_value);
    result.package_size_si_unit = Some(si_unit);
}

fn check_ambiguous_oz(result: &mut PackageParse, unit: PackageSizeUnit, haystack: &str) {
    if unit == PackageSizeUnit::Oz && LIQUID_HINTS.iter().any(|h| haystack.contains(h)) {
        result
            .package_parse_warnings
            .push(PackageWarning::AmbiguousOzLiquid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_size() {
        let p = parse_package(Some("14 oz can"), "");
        assert_eq!(p.package_size_value, Some(14.0));
        assert_eq!(p.package_size_unit, Some(PackageSizeUnit::Oz));
        assert_eq!(p.package_size_si_unit, Some(SiUnit::G));
        assert!((p.package_size_si_value.unwrap() - 14.0 * 28.349523125).abs() < 1e-9);
    }

    #[test]
    fn hyphenated_size_in_line_text() {
        let p = parse_package(None, "1 (15-oz) can black beans");
        assert_eq!(p.package_size_value, Some(15.0));
        assert_eq!(p.package_size_unit, Some(PackageSizeUnit::Oz));
    }

    #[test]
    fn multiplier_with_x() {
        let p = parse_package(Some("2 x 400 g"), "");
        assert_eq!(p.package_multiplier, 2.0);
        assert_eq!(p.package_size_value, Some(400.0));
        assert_eq!(p.package_size_unit, Some(PackageSizeUnit::G));
        assert!(p.package_parse_warnings.contains(&PackageWarning::MultiplierFound));
    }

    #[test]
    fn multiplier_with_unicode_times() {
        let p = parse_package(Some("3 × 330 ml"), "");
        assert_eq!(p.package_multiplier, 3.0);
        assert_eq!(p.package_size_si_value, Some(330.0));
        assert_eq!(p.package_size_si_unit, Some(SiUnit::Ml));
    }

    #[test]
    fn parenthesized_multiplier() {
        let p = parse_package(None, "2 (12 oz) packages frozen spinach");
        assert_eq!(p.package_multiplier, 2.0);
        assert_eq!(p.package_size_value, Some(12.0));
    }

    #[test]
    fn fl_oz_distinct_from_oz() {
        let p = parse_package(Some("8 fl oz"), "");
        assert_eq!(p.package_size_unit, Some(PackageSizeUnit::Floz));
        assert_eq!(p.package_size_si_unit, Some(SiUnit::Ml));
        assert!((p.package_size_si_value.unwrap() - 8.0 * 29.5735295625).abs() < 1e-9);
    }

    #[test]
    fn kilograms_mirror_to_grams() {
        let p = parse_package(Some("1.5 kg bag"), "");
        assert_eq!(p.package_size_unit, Some(PackageSizeUnit::Kg));
        assert_eq!(p.package_size_si_value, Some(1500.0));
    }

    #[test]
    fn ambiguous_oz_near_liquid_words() {
        let p = parse_package(None, "1 (12 oz) bottle apple juice");
        assert!(p.package_parse_warnings.contains(&PackageWarning::AmbiguousOzLiquid));
    }

    #[test]
    fn no_size_warns_only_when_package_text_present() {
        let p = parse_package(Some("family size"), "chia seeds");
        assert!(p.package_parse_warnings.contains(&PackageWarning::NoPackageSizeFound));

        let p = parse_package(None, "chia seeds");
        assert!(p.package_parse_warnings.is_empty());
        assert_eq!(p.package_multiplier, 1.0);
    }
}
