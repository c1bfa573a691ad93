//! Density-table entity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::PackedState;

/// One density measurement for an (ingredient, form) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Density {
    /// Stable identifier, e.g. `DENS_00412`.
    pub density_id: String,
    pub ingredient_id: String,
    pub form_id: String,
    /// Grams per millilitre; must be positive.
    pub g_per_ml: f64,
    /// Packed-state the measurement was taken at, when recorded.
    pub packed_state: Option<PackedState>,
    /// Measurement temperature in °C, when recorded.
    pub temp_c: Option<f64>,
    /// Higher wins when several candidates survive a tier.
    pub source_priority: i32,
    /// Secondary ranking key after recency.
    pub quality_score: f64,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
    pub is_active: bool,
}

impl Density {
    /// Whether this row is usable on `today`: active, and inside its
    /// effective window (open-ended when a bound is absent).
    pub fn covers(&self, today: NaiveDate) -> bool {
        if !self.is_active {
            return false;
        }
        if let Some(from) = self.effective_from {
            if today < from {
                return false;
            }
        }
        if let Some(to) = self.effective_to {
            if today > to {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn density(from: Option<&str>, to: Option<&str>, active: bool) -> Density {
        Density {
            density_id: "DENS_1".into(),
            ingredient_id: "INGR_1".into(),
            form_id: "FORM_WHOLE".into(),
            g_per_ml: 0.6,
            packed_state: None,
            temp_c: None,
            source_priority: 0,
            quality_score: 0.0,
            effective_from: from.map(|d| d.parse().unwrap()),
            effective_to: to.map(|d| d.parse().unwrap()),
            is_active: active,
        }
    }

    #[test]
    fn open_window_covers_any_date() {
        let d = density(None, None, true);
        assert!(d.covers("2026-01-15".parse().unwrap()));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let d = density(Some("2024-01-01"), Some("2024-12-31"), true);
        assert!(d.covers("2024-01-01".parse().unwrap()));
        assert!(d.covers("2024-12-31".parse().unwrap()));
        assert!(!d.covers("2025-01-01".parse().unwrap()));
        assert!(!d.covers("2023-12-31".parse().unwrap()));
    }

    #[test]
    fn inactive_rows_never_cover() {
        let d = density(None, None, false);
        assert!(!d.covers("2026-01-15".parse().unwrap()));
    }
}
