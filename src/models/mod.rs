// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod activity;
pub mod diary;
pub mod goal;
pub mod session;
pub mod user;

pub use activity::ActivityType;
pub use diary::DailyLog;
pub use goal::{Goal, GoalName};
pub use session::{SessionSnapshot, SessionState};
pub use user::UserProfile;
