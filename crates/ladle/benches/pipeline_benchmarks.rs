//! Criterion benchmarks for the hot parsing paths.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

use ladle::pipeline::{intake, quantity, unit, IntakeOutcome};
use ladle::record::{RawRow, TargetDimension};
use ladle::reference::{Density, Form, Ingredient, MeaningTokens, ReferenceSnapshot};
use ladle::{Pipeline, PipelineConfig};

fn bench_quantity_parser(c: &mut Criterion) {
    let inputs = [
        "2", "2.5", "1/2", "1 1/2", "1-1/2", "1½", "1-2", "1 to 2", "about 2", "~2", "one",
        "1,000",
    ];
    c.bench_function("quantity_parse_mixed", |b| {
        b.iter(|| {
            for input in &inputs {
                black_box(quantity::parse_quantity(Some(black_box(input))));
            }
        })
    });
}

fn bench_unit_normalizer(c: &mut Criterion) {
    let inputs = ["g", "cups", "fl. oz.", "tablespoons", "pinch", "glugs"];
    c.bench_function("unit_normalize_mixed", |b| {
        b.iter(|| {
            for input in &inputs {
                black_box(unit::normalize_unit(Some(black_box(input)), true));
            }
        })
    });
}

fn bench_full_row(c: &mut Criterion) {
    let snapshot = Arc::new(ReferenceSnapshot::from_parts(
        vec![Ingredient {
            ingredient_id: "INGR_00037".to_string(),
            primary_name: "all-purpose flour".to_string(),
            aliases: vec!["flour".to_string()],
            category: Some("baking".to_string()),
            default_form_id: Some("FORM_POWDER".to_string()),
            form_overrides: Vec::new(),
        }],
        vec![Form {
            form_id: "FORM_POWDER".to_string(),
            name: "powder".to_string(),
            form_group: None,
            target_dimension: TargetDimension::Mass,
            display_rule_default: None,
        }],
        vec![Density {
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
        }],
        Vec::new(),
        Vec::new(),
        MeaningTokens::new(["flour", "purpose", "all"].map(String::from)),
    ));
    let pipeline = Pipeline::with_config(
        snapshot,
        PipelineConfig {
            today: "2026-08-01".parse().unwrap(),
            density_band: (0.05, 2.0),
        },
    );

    let raw = RawRow {
        recipe_id: Some(json!("R1")),
        ingredient_line_number: Some(json!(1)),
        ingredient_original_text: Some(json!("1 1/2 cups all-purpose flour")),
        qty_value_original: Some("1 1/2".to_string()),
        unit_original: Some("cups".to_string()),
        ..Default::default()
    };
    let IntakeOutcome::Accepted(row) = intake::validate(&raw) else {
        panic!("bench fixture rejected");
    };

    c.bench_function("process_full_row", |b| {
        b.iter(|| black_box(pipeline.process(black_box(&row))))
    });
}

criterion_group!(
    benches,
    bench_quantity_parser,
    bench_unit_normalizer,
    bench_full_row
);
criterion_main!(benches);
