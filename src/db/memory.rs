// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process goal store.
//!
//! Behaves like the Firestore goal collection (all-or-nothing batches,
//! increments applied in place) and can be told to fail, which makes it
//! the store of choice for exercising the workout tracker offline.

use crate::db::GoalStore;
use crate::error::AppError;
use crate::models::{Goal, GoalName};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared in-memory goal collection keyed by document ID.
#[derive(Clone, Default)]
pub struct MemoryStore {
    goals: Arc<Mutex<HashMap<String, Goal>>>,
    fail_queries: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    operations: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Goal>> {
        self.goals.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace a goal.
    pub fn insert_goal(&self, goal: Goal) {
        self.lock().insert(goal.id.clone(), goal);
    }

    /// Remove a goal, returning it if present.
    pub fn remove_goal(&self, goal_id: &str) -> Option<Goal> {
        self.lock().remove(goal_id)
    }

    pub fn goal(&self, goal_id: &str) -> Option<Goal> {
        self.lock().get(goal_id).cloned()
    }

    /// Make subsequent lookups fail.
    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent batch writes fail without applying anything.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of store calls made so far (lookups and writes).
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }
}

impl GoalStore for MemoryStore {
    async fn find_goals(&self, user_id: &str, names: &[GoalName]) -> Result<Vec<Goal>, AppError> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(AppError::Database("query failed (simulated)".to_string()));
        }

        let mut goals: Vec<Goal> = self
            .lock()
            .values()
            .filter(|g| g.user_id == user_id && names.contains(&g.goal_name))
            .cloned()
            .collect();
        goals.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(goals)
    }

    async fn increment_progress(
        &self,
        user_id: &str,
        goal_ids: &[String],
        delta: f64,
    ) -> Result<(), AppError> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database("batch commit failed (simulated)".to_string()));
        }

        let mut goals = self.lock();

        // Validate the whole batch before touching anything.
        if let Some(missing) = goal_ids.iter().find(|id| {
            goals
                .get(id.as_str())
                .map_or(true, |g| g.user_id != user_id)
        }) {
            return Err(AppError::Database(format!(
                "goal {} does not exist; batch rejected",
                missing
            )));
        }

        for goal_id in goal_ids {
            if let Some(goal) = goals.get_mut(goal_id.as_str()) {
                goal.progress += delta;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(user_id: &str, name: GoalName, progress: f64) -> Goal {
        let mut goal = Goal::new(user_id, name, "2026-01-01T00:00:00Z");
        goal.progress = progress;
        goal
    }

    #[tokio::test]
    async fn test_find_goals_scoped_to_user_and_names() {
        let store = MemoryStore::new();
        store.insert_goal(goal("alice", GoalName::Run, 0.0));
        store.insert_goal(goal("alice", GoalName::Yoga, 0.0));
        store.insert_goal(goal("bob", GoalName::Run, 0.0));

        let found = store
            .find_goals("alice", &[GoalName::Run, GoalName::Treadmill])
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "alice_run");
    }

    #[tokio::test]
    async fn test_batch_with_missing_goal_applies_nothing() {
        let store = MemoryStore::new();
        store.insert_goal(goal("alice", GoalName::Run, 1.0));

        let ids = vec!["alice_run".to_string(), "alice_treadmill".to_string()];
        let result = store.increment_progress("alice", &ids, 2.0).await;

        assert!(result.is_err());
        assert_eq!(store.goal("alice_run").unwrap().progress, 1.0);
    }

    #[tokio::test]
    async fn test_batch_rejects_other_users_goal() {
        let store = MemoryStore::new();
        store.insert_goal(goal("bob", GoalName::Run, 1.0));

        let ids = vec!["bob_run".to_string()];
        assert!(store.increment_progress("alice", &ids, 2.0).await.is_err());
        assert_eq!(store.goal("bob_run").unwrap().progress, 1.0);
    }

    #[tokio::test]
    async fn test_operation_count() {
        let store = MemoryStore::new();
        assert_eq!(store.operation_count(), 0);
        let _ = store.find_goals("alice", &[GoalName::Run]).await;
        assert_eq!(store.operation_count(), 1);
    }
}
