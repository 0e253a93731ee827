// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout activity types and how they convert into goal progress.

use crate::models::goal::GoalName;
use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Activity a user can time with the workout stopwatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/lib/generated/")
)]
pub enum ActivityType {
    Run,
    Walk,
    Cycling,
    Yoga,
    Strength,
    Swimming,
}

impl ActivityType {
    pub const ALL: [ActivityType; 6] = [
        ActivityType::Run,
        ActivityType::Walk,
        ActivityType::Cycling,
        ActivityType::Yoga,
        ActivityType::Strength,
        ActivityType::Swimming,
    ];

    /// Goals this activity contributes progress to.
    pub fn goal_names(self) -> &'static [GoalName] {
        match self {
            ActivityType::Run => &[GoalName::Run, GoalName::Treadmill],
            ActivityType::Walk => &[GoalName::Walk, GoalName::Treadmill],
            ActivityType::Cycling => &[GoalName::Cycling],
            ActivityType::Yoga => &[GoalName::Yoga, GoalName::Stretch, GoalName::Meditate],
            ActivityType::Strength => &[GoalName::Strength],
            ActivityType::Swimming => &[GoalName::Swimming],
        }
    }

    /// Assumed pace in km/h for distance-based activities.
    ///
    /// `None` means the activity is tracked by duration.
    pub fn pace_kmh(self) -> Option<f64> {
        match self {
            ActivityType::Run => Some(8.0),
            ActivityType::Walk => Some(5.0),
            ActivityType::Cycling => Some(15.0),
            ActivityType::Yoga | ActivityType::Strength | ActivityType::Swimming => None,
        }
    }

    /// Convert timed minutes into goal progress (km or minutes).
    pub fn progress_for_minutes(self, minutes: f64) -> f64 {
        match self.pace_kmh() {
            Some(kmh) => minutes * (kmh / 60.0),
            None => minutes,
        }
    }

    /// Unit of the progress produced by [`Self::progress_for_minutes`].
    pub fn progress_unit(self) -> &'static str {
        if self.pace_kmh().is_some() {
            "km"
        } else {
            "min"
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActivityType::Run => "Run",
            ActivityType::Walk => "Walk",
            ActivityType::Cycling => "Cycling",
            ActivityType::Yoga => "Yoga",
            ActivityType::Strength => "Strength",
            ActivityType::Swimming => "Swimming",
        };
        f.write_str(label)
    }
}
