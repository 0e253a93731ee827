// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod sessions;
pub mod ticker;
pub mod tracker;

pub use sessions::{SessionRegistry, SharedTracker, DEFAULT_SESSION_IDLE_TTL, SWEEP_PERIOD};
pub use ticker::{Ticker, TICK_PERIOD};
pub use tracker::{
    CurrentUser, TrackerError, ValidationError, WorkoutProgressTracker, WorkoutSaved,
};
