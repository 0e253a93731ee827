// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Goal catalog and per-user goal records.

use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Goals a user can pick from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/lib/generated/")
)]
pub enum GoalName {
    DrinkWater,
    Walk,
    Run,
    Treadmill,
    Yoga,
    Meditate,
    Stretch,
    Cycling,
    Strength,
    Swimming,
}

impl GoalName {
    pub const ALL: [GoalName; 10] = [
        GoalName::DrinkWater,
        GoalName::Walk,
        GoalName::Run,
        GoalName::Treadmill,
        GoalName::Yoga,
        GoalName::Meditate,
        GoalName::Stretch,
        GoalName::Cycling,
        GoalName::Strength,
        GoalName::Swimming,
    ];

    /// Stored key; matches the serde representation.
    pub fn as_key(self) -> &'static str {
        match self {
            GoalName::DrinkWater => "drink_water",
            GoalName::Walk => "walk",
            GoalName::Run => "run",
            GoalName::Treadmill => "treadmill",
            GoalName::Yoga => "yoga",
            GoalName::Meditate => "meditate",
            GoalName::Stretch => "stretch",
            GoalName::Cycling => "cycling",
            GoalName::Strength => "strength",
            GoalName::Swimming => "swimming",
        }
    }

    /// Default `(target, unit)` for a newly created goal.
    pub fn default_target(self) -> (f64, &'static str) {
        match self {
            GoalName::DrinkWater => (2.5, "L"),
            GoalName::Walk => (5.0, "km"),
            GoalName::Run | GoalName::Treadmill => (3.0, "km"),
            GoalName::Cycling => (15.0, "km"),
            GoalName::Yoga
            | GoalName::Meditate
            | GoalName::Stretch
            | GoalName::Strength
            | GoalName::Swimming => (30.0, "min"),
        }
    }
}

impl fmt::Display for GoalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GoalName::DrinkWater => "Drink water",
            GoalName::Walk => "Walk",
            GoalName::Run => "Run",
            GoalName::Treadmill => "Treadmill",
            GoalName::Yoga => "Yoga",
            GoalName::Meditate => "Meditate",
            GoalName::Stretch => "Stretch",
            GoalName::Cycling => "Cycling",
            GoalName::Strength => "Strength",
            GoalName::Swimming => "Swimming",
        };
        f.write_str(label)
    }
}

/// Join goal names for display ("Yoga, Stretch, Meditate").
pub fn join_goal_names(names: &[GoalName]) -> String {
    names
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Stored goal record in Firestore.
///
/// One document per user per goal name, keyed by [`Goal::document_id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Document ID (`{user_id}_{goal_key}`)
    pub id: String,
    /// Owner
    pub user_id: String,
    pub goal_name: GoalName,
    /// Accumulated progress in `unit`
    #[serde(default)]
    pub progress: f64,
    /// Completion threshold in `unit`
    pub target: f64,
    /// Display unit ("km", "L", "min")
    pub unit: String,
    /// When the goal was created (ISO 8601)
    #[serde(default)]
    pub created_at: String,
}

impl Goal {
    /// Build a fresh goal from the catalog defaults.
    pub fn new(user_id: &str, goal_name: GoalName, now: &str) -> Self {
        let (target, unit) = goal_name.default_target();
        Self {
            id: Self::document_id(user_id, goal_name),
            user_id: user_id.to_string(),
            goal_name,
            progress: 0.0,
            target,
            unit: unit.to_string(),
            created_at: now.to_string(),
        }
    }

    pub fn document_id(user_id: &str, goal_name: GoalName) -> String {
        format!("{}_{}", user_id, goal_name.as_key())
    }

    /// Fraction of the target reached, capped at 1.0.
    pub fn completion(&self) -> f64 {
        if self.target <= 0.0 {
            return 0.0;
        }
        (self.progress / self.target).clamp(0.0, 1.0)
    }
}
