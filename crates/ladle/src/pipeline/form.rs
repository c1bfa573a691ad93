//! Form resolution: a five-tier precedence cascade over token hints,
//! per-ingredient overrides, unit bias, and defaults.

use std::collections::BTreeSet;

use crate::record::{Dimension, FormSource, FormWarning};
use crate::reference::normalize::fold;
use crate::reference::{Ingredient, ReferenceSnapshot};

/// Form-resolution block.
#[derive(Debug, Clone, Default)]
pub struct FormResolution {
    pub resolved_form_id: Option<String>,
    pub form_source: Option<FormSource>,
    pub form_conflict_flag: bool,
    pub form_warnings: Vec<FormWarning>,
    pub form_notes: Option<String>,
}

/// Categories whose volume measurements usually mean the ground form.
const DRY_BIAS_CATEGORIES: &[&str] = &["spice", "herb", "seasoning"];

/// Collect candidate hint tokens from the given texts: lowercase words that
/// appear in the global token→form map, in the ingredient's override map, or
/// in the meaning-token allow-list.
fn collect_hint_tokens(
    snapshot: &ReferenceSnapshot,
    ingredient: &Ingredient,
    texts: &[Option<&str>],
) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();
    for text in texts.iter().flatten() {
        for word in fold(text).split_whitespace() {
            let relevant = snapshot.form_for_token(word).is_some()
                || ingredient.override_for(word).is_some()
                || snapshot.meaning().contains(word);
            if relevant {
                tokens.insert(word.to_string());
            }
        }
    }
    tokens
}

/// Resolve the physical form for a linked ingredient.
///
/// Precedence, first hit wins: per-ingredient override (P1), global token map
/// (P2, conflicts flagged), unit bias (P3), ingredient default (P4), category
/// default (P5).
pub fn resolve_form(
    snapshot: &ReferenceSnapshot,
    ingredient: &Ingredient,
    texts: &[Option<&str>],
    original_dimension: Option<Dimension>,
) -> FormResolution {
    let tokens = collect_hint_tokens(snapshot, ingredient, texts);

    // P1: per-ingredient override map, in its declared order.
    for (token, form_id) in &ingredient.form_overrides {
        if tokens.contains(token) {
            return FormResolution {
                resolved_form_id: Some(form_id.clone()),
                form_source: Some(FormSource::Alias),
                ..FormResolution::default()
            };
        }
    }

    // P2: global token→form map. Multiple distinct forms are deduped by the
    // map's declared precedence; a surviving disagreement is a conflict.
    let mut hits: Vec<(usize, &str)> = tokens
        .iter()
        .filter_map(|t| snapshot.form_for_token(t))
        .collect();
    hits.sort_by_key(|(prec, _)| *prec);
    let mut global_hits: Vec<(usize, &str)> = Vec::new();
    for (prec, form_id) in hits {
        if !global_hits.iter().any(|(_, f)| *f == form_id) {
            global_hits.push((prec, form_id));
        }
    }
    if let Some(&(_, winner)) = global_hits.first() {
        let conflict = global_hits.len() > 1;
        let notes = conflict.then(|| {
            let set: Vec<&str> = global_hits.iter().map(|(_, f)| *f).collect();
            format!("conflicting form hints: {}", set.join(", "))
        });
        return FormResolution {
            resolved_form_id: Some(winner.to_string()),
            form_source: Some(FormSource::Explicit),
            form_conflict_flag: conflict,
            form_warnings: Vec::new(),
            form_notes: notes,
        };
    }

    // P3: unit-bias heuristic. A volume unit on a dry-category ingredient
    // implies the ground form, when the ingredient actually has one.
    if original_dimension == Some(Dimension::Volume) {
        let dry = ingredient
            .category
            .as_deref()
            .map(|c| DRY_BIAS_CATEGORIES.contains(&c.to_lowercase().as_str()))
            .unwrap_or(false);
        if dry {
            if let Some((_, ground)) = snapshot.form_for_token("ground") {
                let supported = snapshot.has_density_for_form(&ingredient.ingredient_id, ground)
                    || ingredient.default_form_id.as_deref() == Some(ground);
                if supported {
                    return FormResolution {
                        resolved_form_id: Some(ground.to_string()),
                        form_source: Some(FormSource::UnitBias),
                        ..FormResolution::default()
                    };
                }
            }
        }
    }

    // P4: ingredient default.
    if let Some(default) = &ingredient.default_form_id {
        return FormResolution {
            resolved_form_id: Some(default.clone()),
            form_source: Some(FormSource::Default),
            ..FormResolution::default()
        };
    }

    // P5: category default.
    if let Some(category) = &ingredient.category {
        if let Some(form_id) = snapshot.category_default(&category.to_lowercase()) {
            return FormResolution {
                resolved_form_id: Some(form_id.to_string()),
                form_source: Some(FormSource::CategoryDefault),
                ..FormResolution::default()
            };
        }
    }

    FormResolution {
        form_warnings: vec![FormWarning::NoFormMatch],
        ..FormResolution::default()
    }
}
