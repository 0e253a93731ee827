// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{Goal, GoalName};
use std::future::Future;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Goal records (keyed by `{user_id}_{goal_key}`)
    pub const GOALS: &str = "goals";
    /// Daily diary documents (keyed by `{user_id}_{YYYY-MM-DD}`)
    pub const DAILY_LOGS: &str = "daily_logs";
}

/// Goal storage needed to turn a finished workout into progress.
///
/// `increment_progress` must be all-or-nothing: either every listed goal
/// gains `delta` or none does. The increment itself is applied by the store,
/// never as a read-modify-write.
pub trait GoalStore: Send + Sync {
    /// Goals of `user_id` whose name is in `names`.
    fn find_goals(
        &self,
        user_id: &str,
        names: &[GoalName],
    ) -> impl Future<Output = Result<Vec<Goal>, AppError>> + Send;

    /// Add `delta` to the progress of every goal in `goal_ids`.
    fn increment_progress(
        &self,
        user_id: &str,
        goal_ids: &[String],
        delta: f64,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}
