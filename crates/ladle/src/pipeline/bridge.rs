//! Density bridge: tiered candidate search and deterministic ranking.

use chrono::NaiveDate;

use crate::record::{BridgeRequirement, BridgeSelectionPath, BridgeWarning, PackedState};
use crate::reference::{Density, ReferenceSnapshot};

/// Density-lookup block.
#[derive(Debug, Clone, Default)]
pub struct BridgeLookup {
    pub density_id: Option<String>,
    pub density_g_per_ml: Option<f64>,
    pub bridge_selection_path: Option<BridgeSelectionPath>,
    pub bridge_inputs_ready: bool,
    pub flag_needs_density_lookup: bool,
    pub bridge_warnings: Vec<BridgeWarning>,
}

/// Temperature beyond which a density measurement is flagged, in °C from 20.
const TEMP_TOLERANCE_C: f64 = 10.0;

/// Detect a packed-state hint in modifier or line text.
pub fn detect_packed_hint(texts: &[Option<&str>]) -> Option<PackedState> {
    for text in texts.iter().flatten() {
        let lower = text.to_lowercase();
        if lower.contains("loosely packed") {
            return Some(PackedState::LooselyPacked);
        }
        if lower.contains("packed") {
            return Some(PackedState::Packed);
        }
    }
    None
}

/// Find the density for a bridged conversion.
///
/// Tiers are tried in order and each only when all earlier tiers produced
/// nothing; ranking inside the winning tier is a total order over stable
/// fields (source priority, recency, quality, id).
pub fn lookup_density(
    snapshot: &ReferenceSnapshot,
    ingredient_id: &str,
    resolved_form_id: Option<&str>,
    bridge_required: BridgeRequirement,
    packed_hint: Option<PackedState>,
    today: NaiveDate,
    plausible_band: (f64, f64),
) -> BridgeLookup {
    if bridge_required == BridgeRequirement::None {
        return BridgeLookup {
            bridge_inputs_ready: true,
            ..BridgeLookup::default()
        };
    }

    let live: Vec<&Density> = snapshot
        .densities_for(ingredient_id)
        .iter()
        .filter(|d| d.covers(today))
        .collect();

    let default_form = snapshot.default_form_for(ingredient_id);
    let group: Option<&[String]> = resolved_form_id.and_then(|f| snapshot.form_group(f));

    let tiers: [(BridgeSelectionPath, Box<dyn Fn(&&Density) -> bool + '_>); 5] = [
        (
            BridgeSelectionPath::H1ExactFormPacked,
            Box::new(|d: &&Density| {
                packed_hint.is_some()
                    && resolved_form_id == Some(d.form_id.as_str())
                    && d.packed_state == packed_hint
            }),
        ),
        (
            BridgeSelectionPath::H2ExactForm,
            Box::new(|d: &&Density| resolved_form_id == Some(d.form_id.as_str())),
        ),
        (
            BridgeSelectionPath::H3FormGroup,
            Box::new(|d: &&Density| {
                group.map(|g| g.iter().any(|f| f == &d.form_id)).unwrap_or(false)
            }),
        ),
        (
            BridgeSelectionPath::H4DefaultForm,
            Box::new(|d: &&Density| default_form == Some(d.form_id.as_str())),
        ),
        (BridgeSelectionPath::H5AnyForm, Box::new(|_| true)),
    ];

    for (path, filter) in &tiers {
        let mut candidates: Vec<&Density> = live.iter().copied().filter(|d| filter(d)).collect();
        if candidates.is_empty() {
            continue;
        }
        candidates.sort_by(|a, b| rank_key(a, b));
        let chosen = candidates[0];
        return finish(chosen, *path, packed_hint, plausible_band);
    }

    BridgeLookup {
        bridge_selection_path: Some(BridgeSelectionPath::H0NoDensity),
        flag_needs_density_lookup: true,
        bridge_inputs_ready: false,
        ..BridgeLookup::default()
    }
}

/// Total ranking: source priority desc, effective_from most-recent-first
/// (absent sorts oldest), quality desc, density_id asc.
fn rank_key(a: &Density, b: &Density) -> std::cmp::Ordering {
    b.source_priority
        .cmp(&a.source_priority)
        .then_with(|| b.effective_from.cmp(&a.effective_from))
        .then_with(|| {
            b.quality_score
                .partial_cmp(&a.quality_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .then_with(|| a.density_id.cmp(&b.density_id))
}

fn finish(
    chosen: &Density,
    path: BridgeSelectionPath,
    packed_hint: Option<PackedState>,
    plausible_band: (f64, f64),
) -> BridgeLookup {
    let mut warnings = Vec::new();
    let (lo, hi) = plausible_band;
    let in_band = chosen.g_per_ml >= lo && chosen.g_per_ml <= hi;
    if !in_band {
        warnings.push(BridgeWarning::SanityRangeEdge);
    }
    if packed_hint.is_some()
        && path != BridgeSelectionPath::H1ExactFormPacked
        && chosen.packed_state != packed_hint
    {
        warnings.push(BridgeWarning::PackedStateMismatch);
    }
    if let Some(temp) = chosen.temp_c {
        if (temp - 20.0).abs() > TEMP_TOLERANCE_C {
            warnings.push(BridgeWarning::TempMismatch);
        }
    }

    BridgeLookup {
        density_id: Some(chosen.density_id.clone()),
        density_g_per_ml: Some(chosen.g_per_ml),
        bridge_selection_path: Some(path),
        bridge_inputs_ready: in_band,
        flag_needs_density_lookup: false,
        bridge_warnings: warnings,
    }
}
