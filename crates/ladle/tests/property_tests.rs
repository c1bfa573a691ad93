//! Property-based tests for the canonicalization pipeline.
//!
//! These verify, under arbitrary inputs:
//!
//! 1. **No panics**: parsers never crash on any input.
//! 2. **Determinism**: the same input always produces the same output.
//! 3. **Invariants**: min ≤ max, midpoint identity, counts never bridge,
//!    bridged conversions always carry a positive density.
//!
//! Run with more cases via `PROPTEST_CASES=10000 cargo test --test property_tests`.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;

use ladle::pipeline::{intake, quantity, unit, IntakeOutcome};
use ladle::record::{
    BridgeRequirement, CanonicalUnit, Dimension, RawRow, TargetDimension,
};
use ladle::reference::{Density, Form, Ingredient, MeaningTokens, ReferenceSnapshot};
use ladle::{CleanRow, Pipeline, PipelineConfig};

fn fixture_snapshot() -> Arc<ReferenceSnapshot> {
    let ingredients = vec![
        Ingredient {
            ingredient_id: "INGR_00037".to_string(),
            primary_name: "all-purpose flour".to_string(),
            aliases: vec!["flour".to_string()],
            category: Some("baking".to_string()),
            default_form_id: Some("FORM_POWDER".to_string()),
            form_overrides: Vec::new(),
        },
        Ingredient {
            ingredient_id: "INGR_00450".to_string(),
            primary_name: "egg".to_string(),
            aliases: vec!["eggs".to_string()],
            category: Some("egg".to_string()),
            default_form_id: Some("FORM_WHOLE".to_string()),
            form_overrides: Vec::new(),
        },
        Ingredient {
            ingredient_id: "INGR_01091".to_string(),
            primary_name: "chia seeds".to_string(),
            aliases: vec!["chia".to_string()],
            category: Some("seed".to_string()),
            default_form_id: Some("FORM_SEEDS".to_string()),
            form_overrides: Vec::new(),
        },
    ];
    let forms = vec![
        Form {
            form_id: "FORM_POWDER".to_string(),
            name: "powder".to_string(),
            form_group: None,
            target_dimension: TargetDimension::Mass,
            display_rule_default: None,
        },
        Form {
            form_id: "FORM_WHOLE".to_string(),
            name: "whole".to_string(),
            form_group: None,
            target_dimension: TargetDimension::Auto,
            display_rule_default: None,
        },
        Form {
            form_id: "FORM_SEEDS".to_string(),
            name: "seeds".to_string(),
            form_group: None,
            target_dimension: TargetDimension::Auto,
            display_rule_default: None,
        },
    ];
    let densities = vec![Density {
        density_id: "DENS_00010".to_string(),
        ingredient_id: "INGR_00037".to_string(),
        form_id: "FORM_POWDER".to_string(),
        g_per_ml: 0.528,
        packed_state: None,
        temp_c: None,
        source_priority: 1,
        quality_score: 0.9,
        effective_from: None,
        effective_to: None,
        is_active: true,
    }];
    Arc::new(ReferenceSnapshot::from_parts(
        ingredients,
        forms,
        densities,
        Vec::new(),
        Vec::new(),
        MeaningTokens::new(["chia", "seed", "flour", "purpose", "all", "egg"].map(String::from)),
    ))
}

fn fixture_pipeline() -> Pipeline {
    Pipeline::with_config(
        fixture_snapshot(),
        PipelineConfig {
            today: "2026-08-01".parse().unwrap(),
            density_band: (0.05, 2.0),
        },
    )
}

fn clean_row(text: &str, qty: &str, unit: &str) -> Option<CleanRow> {
    let raw = RawRow {
        recipe_id: Some(json!("R1")),
        ingredient_line_number: Some(json!(1)),
        ingredient_original_text: Some(json!(text)),
        qty_value_original: Some(qty.to_string()),
        unit_original: Some(unit.to_string()),
        ..Default::default()
    };
    match intake::validate(&raw) {
        IntakeOutcome::Accepted(row) => Some(*row),
        IntakeOutcome::Rejected(_) => None,
    }
}

/// Strings that look like quantities.
fn quantity_like() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,4}",
        "[0-9]{1,3}\\.[0-9]{1,3}",
        "[0-9]{1,2}/[0-9]{1,2}",
        "[0-9]{1,2} [0-9]/[0-9]",
        "[0-9]{1,2}-[0-9]{1,2}",
        "[0-9]{1,2} to [0-9]{1,2}",
        "about [0-9]{1,2}",
        "~[0-9]{1,2}",
        "[a-z]{1,10}",
    ]
}

/// Arbitrary printable noise, including unicode fractions.
fn noisy_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ -~]{0,40}",
        "[0-9½¼¾⅓⅔⅛ /x×.,+~-]{0,20}",
        Just("½".to_string()),
        Just("1½".to_string()),
    ]
}

fn unit_like() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("g".to_string()),
        Just("cup".to_string()),
        Just("tsp".to_string()),
        Just("fl oz".to_string()),
        Just("oz".to_string()),
        Just("eggs".to_string()),
        Just("pinch".to_string()),
        "[a-z]{1,8}",
    ]
}

mod quantity_parser {
    use super::*;

    proptest! {
        #[test]
        fn never_panics(input in noisy_text()) {
            let _ = quantity::parse_quantity(Some(&input));
        }

        #[test]
        fn is_deterministic(input in quantity_like()) {
            let a = quantity::parse_quantity(Some(&input));
            let b = quantity::parse_quantity(Some(&input));
            prop_assert_eq!(format!("{a:?}"), format!("{b:?}"));
        }

        /// Invariant: min ≤ max when both set, both null together otherwise.
        #[test]
        fn min_max_invariant(input in quantity_like()) {
            let parsed = quantity::parse_quantity(Some(&input));
            match (parsed.qty_min, parsed.qty_max) {
                (Some(min), Some(max)) => prop_assert!(min <= max),
                (None, None) => {}
                other => prop_assert!(false, "one-sided quantity: {other:?}"),
            }
        }

        /// Parsed values are finite and non-negative.
        #[test]
        fn values_are_finite(input in noisy_text()) {
            let parsed = quantity::parse_quantity(Some(&input));
            for v in [parsed.qty_min, parsed.qty_max].into_iter().flatten() {
                prop_assert!(v.is_finite() && v >= 0.0);
            }
        }
    }
}

mod unit_normalizer {
    use super::*;

    proptest! {
        #[test]
        fn never_panics(input in noisy_text(), has_qty in any::<bool>()) {
            let _ = unit::normalize_unit(Some(&input), has_qty);
        }

        /// The enum and dimension always agree.
        #[test]
        fn dimension_matches_enum(input in unit_like(), has_qty in any::<bool>()) {
            let norm = unit::normalize_unit(Some(&input), has_qty);
            if let Some(unit_enum) = norm.unit_enum {
                prop_assert_eq!(norm.original_dimension, Some(unit_enum.dimension()));
            } else {
                prop_assert_eq!(norm.original_dimension, None);
            }
        }

        /// Unknown units are flagged, never silently defaulted.
        #[test]
        fn unknown_is_flagged(input in "[qxz]{3,8}") {
            let norm = unit::normalize_unit(Some(&input), true);
            prop_assert!(norm.unit_enum.is_none());
            prop_assert!(norm.flag_nonstandard_unit);
        }
    }
}

mod pipeline_invariants {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn never_panics_on_noise(
            text in noisy_text(),
            qty in quantity_like(),
            unit in unit_like(),
        ) {
            let pipeline = fixture_pipeline();
            if let Some(row) = clean_row(&format!("x {text}"), &qty, &unit) {
                let _ = pipeline.process(&row);
            }
        }

        #[test]
        fn record_invariants_hold(
            qty in quantity_like(),
            unit in unit_like(),
            name in prop_oneof![
                Just("chia seeds"),
                Just("flour"),
                Just("eggs"),
                Just("unknown thing"),
            ],
        ) {
            let pipeline = fixture_pipeline();
            let text = format!("{qty} {unit} {name}");
            let Some(row) = clean_row(&text, &qty, &unit) else { return Ok(()) };
            let record = pipeline.process(&row);

            // 1. qty_min ≤ qty_max, or both null.
            match (record.qty_min, record.qty_max) {
                (Some(min), Some(max)) => prop_assert!(min <= max),
                (None, None) => {}
                other => prop_assert!(false, "one-sided quantity: {other:?}"),
            }

            // 2. midpoint identity.
            if let (Some(min), Some(max), Some(mid)) = (
                record.canonical_qty_min,
                record.canonical_qty_max,
                record.canonical_qty,
            ) {
                prop_assert!((mid - (min + max) / 2.0).abs() < 1e-9);
            }

            // 3. counts never bridge and never touch a density.
            if record.canonical_unit == Some(CanonicalUnit::Each) {
                prop_assert_eq!(record.bridge_required, BridgeRequirement::None);
                prop_assert!(record.density_id.is_none());
                prop_assert_eq!(record.original_dimension, Some(Dimension::Count));
            }

            // 4. bridged conversions carry a positive density.
            if record.canonical_qty.is_some()
                && record.bridge_required != BridgeRequirement::None
            {
                prop_assert!(record.density_g_per_ml.unwrap_or(0.0) > 0.0);
            }

            // 7. no count unit with a mass/volume original dimension.
            if record.canonical_unit == Some(CanonicalUnit::Each) {
                prop_assert!(!matches!(
                    record.original_dimension,
                    Some(Dimension::Mass) | Some(Dimension::Volume)
                ));
            }
        }

        /// 5. Re-processing the same row yields identical records.
        #[test]
        fn processing_is_deterministic(
            qty in quantity_like(),
            unit in unit_like(),
        ) {
            let pipeline = fixture_pipeline();
            let Some(row) = clean_row(&format!("{qty} {unit} flour"), &qty, &unit) else {
                return Ok(());
            };
            let a = serde_json::to_string(&pipeline.process(&row)).unwrap();
            let b = serde_json::to_string(&pipeline.process(&row)).unwrap();
            prop_assert_eq!(a, b);
        }

        /// 6. Conversion factors round-trip within 1e-9.
        #[test]
        fn conversion_round_trips(value in 0.01f64..1000.0) {
            use ladle::reference::units;
            use ladle::record::UnitEnum;

            for unit in [UnitEnum::Tsp, UnitEnum::Cup, UnitEnum::Oz, UnitEnum::Lb] {
                let factor = units::mass_to_g(unit)
                    .or_else(|| units::volume_to_ml(unit))
                    .unwrap();
                let converted = value * factor;
                prop_assert!((converted / factor - value).abs() < 1e-9);
            }
        }
    }
}
