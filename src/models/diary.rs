// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily diary model: water intake and macronutrients.

use serde::{Deserialize, Serialize};

/// Largest single water entry accepted, in millilitres.
pub const MAX_WATER_ENTRY_ML: f64 = 5000.0;

/// Largest single protein or carbohydrate entry accepted, in grams.
pub const MAX_NUTRIENT_ENTRY_G: f64 = 1000.0;

/// Per-user, per-day diary document.
///
/// Stored at `daily_logs/{user_id}_{YYYY-MM-DD}`. `water_ml` is only ever
/// written through an atomic increment; the nutrient fields are written
/// with a field mask so they never overwrite it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    /// Water consumed that day (millilitres)
    #[serde(default)]
    pub water_ml: f64,
    /// Protein eaten that day (grams)
    #[serde(default)]
    pub protein_g: f64,
    /// Carbohydrates eaten that day (grams)
    #[serde(default)]
    pub carbs_g: f64,
}

impl DailyLog {
    pub fn document_id(user_id: &str, date: &str) -> String {
        format!("{}_{}", user_id, date)
    }

    /// Water consumed, in litres (the unit of the water goal).
    pub fn water_litres(&self) -> f64 {
        self.water_ml / 1000.0
    }

    /// Add (positive) or remove (negative) nutrients. Totals never drop
    /// below zero.
    pub fn adjust_nutrients(&mut self, protein_g: f64, carbs_g: f64) {
        self.protein_g = (self.protein_g + protein_g).max(0.0);
        self.carbs_g = (self.carbs_g + carbs_g).max(0.0);
    }
}

/// Today's date key (`YYYY-MM-DD`, UTC).
pub fn today_key() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}
