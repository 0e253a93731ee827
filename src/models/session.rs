// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout session snapshots returned to clients.

use crate::models::ActivityType;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Lifecycle state of the workout stopwatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/lib/generated/")
)]
pub enum SessionState {
    /// No activity selected
    Idle,
    /// Activity selected, nothing timed yet
    Selected,
    /// Tick active
    Running,
    /// Tick cancelled, elapsed time frozen
    Paused,
}

/// Point-in-time view of a tracker's session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/lib/generated/")
)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub activity: Option<ActivityType>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub elapsed_seconds: u64,
    pub running: bool,
    /// Stopwatch display (`MM:SS`)
    pub display: String,
}

impl SessionSnapshot {
    pub fn idle() -> Self {
        Self {
            state: SessionState::Idle,
            activity: None,
            elapsed_seconds: 0,
            running: false,
            display: format_elapsed(0),
        }
    }
}

/// Format seconds as `MM:SS`; minutes are not wrapped into hours.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
