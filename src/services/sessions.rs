// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user workout trackers for the HTTP API.
//!
//! Clients can walk away mid-workout, so every entry records when it was
//! last used and a periodic sweep drops the ones nobody has touched for the
//! idle TTL. Dropping a tracker cancels its ticker.

use crate::db::GoalStore;
use crate::models::SessionState;
use crate::services::tracker::WorkoutProgressTracker;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// How long an untouched session is kept (running or not).
pub const DEFAULT_SESSION_IDLE_TTL: Duration = Duration::from_secs(4 * 60 * 60);

/// Interval between sweeps for abandoned sessions.
pub const SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// A user's tracker, locked for the duration of one request.
pub type SharedTracker<S> = Arc<Mutex<WorkoutProgressTracker<S>>>;

struct SessionEntry<S> {
    tracker: SharedTracker<S>,
    last_touched: Instant,
}

/// One tracker per signed-in user.
///
/// Each tracker sits behind its own async lock so a save (which awaits the
/// store) serializes with that user's other timer actions only.
pub struct SessionRegistry<S> {
    trackers: DashMap<String, SessionEntry<S>>,
    store: S,
    idle_ttl: Duration,
}

impl<S: GoalStore + Clone> SessionRegistry<S> {
    pub fn new(store: S) -> Self {
        Self::with_idle_ttl(store, DEFAULT_SESSION_IDLE_TTL)
    }

    pub fn with_idle_ttl(store: S, idle_ttl: Duration) -> Self {
        Self {
            trackers: DashMap::new(),
            store,
            idle_ttl,
        }
    }

    /// Get the user's tracker, creating an idle one if needed.
    pub fn tracker(&self, user_id: &str) -> SharedTracker<S> {
        let mut entry = self
            .trackers
            .entry(user_id.to_string())
            .or_insert_with(|| SessionEntry {
                tracker: Arc::new(Mutex::new(WorkoutProgressTracker::new(self.store.clone()))),
                last_touched: Instant::now(),
            });
        entry.last_touched = Instant::now();
        Arc::clone(&entry.tracker)
    }

    /// Get the user's tracker only if one exists.
    pub fn existing(&self, user_id: &str) -> Option<SharedTracker<S>> {
        self.trackers.get_mut(user_id).map(|mut entry| {
            entry.last_touched = Instant::now();
            Arc::clone(&entry.tracker)
        })
    }

    /// Drop the user's tracker, cancelling any running timer.
    pub fn remove(&self, user_id: &str) {
        if self.trackers.remove(user_id).is_some() {
            tracing::debug!(user_id, "Workout tracker removed");
        }
    }

    /// Drop the user's tracker if it holds no session.
    ///
    /// A tracker locked by an in-flight request is left alone.
    pub fn remove_if_idle(&self, user_id: &str) {
        self.trackers.remove_if(user_id, |_, entry| {
            entry
                .tracker
                .try_lock()
                .is_ok_and(|t| t.state() == SessionState::Idle)
        });
    }

    /// Drop every tracker untouched for the idle TTL. Returns how many went.
    ///
    /// Trackers locked by an in-flight request are kept.
    pub fn evict_stale(&self) -> usize {
        let now = Instant::now();
        let mut evicted = 0;

        self.trackers.retain(|user_id, entry| {
            let stale = now.duration_since(entry.last_touched) >= self.idle_ttl;
            if !stale || entry.tracker.try_lock().is_err() {
                return true;
            }
            tracing::info!(user_id = %user_id, "Evicting abandoned workout session");
            evicted += 1;
            false
        });

        evicted
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::ActivityType;

    #[tokio::test]
    async fn test_tracker_is_reused_per_user() {
        let registry = SessionRegistry::new(MemoryStore::new());

        let first = registry.tracker("alice");
        first.lock().await.select_activity(ActivityType::Run);

        let again = registry.tracker("alice");
        assert_eq!(again.lock().await.activity(), Some(ActivityType::Run));

        let other = registry.tracker("bob");
        assert_eq!(other.lock().await.state(), SessionState::Idle);
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_if_idle_keeps_active_sessions() {
        let registry = SessionRegistry::new(MemoryStore::new());
        registry
            .tracker("alice")
            .lock()
            .await
            .select_activity(ActivityType::Yoga);
        registry.tracker("bob");

        registry.remove_if_idle("alice");
        registry.remove_if_idle("bob");

        assert!(registry.existing("alice").is_some());
        assert!(registry.existing("bob").is_none());
    }

    #[tokio::test]
    async fn test_remove() {
        let registry = SessionRegistry::new(MemoryStore::new());
        registry.tracker("alice");
        registry.remove("alice");
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_evict_stale_drops_abandoned_running_session() {
        let registry = SessionRegistry::with_idle_ttl(MemoryStore::new(), Duration::from_secs(60));

        let alice = registry.tracker("alice");
        {
            let mut tracker = alice.lock().await;
            tracker.select_activity(ActivityType::Run);
            tracker.toggle_running().unwrap();
        }
        let alice_weak = Arc::downgrade(&alice);
        drop(alice);
        registry.tracker("bob");

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(registry.existing("bob").is_some());
        assert_eq!(registry.evict_stale(), 0);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(registry.evict_stale(), 1);

        assert!(registry.existing("alice").is_none());
        assert!(registry.existing("bob").is_some());
        // Last reference gone, so the session and its ticker are dropped
        assert!(alice_weak.upgrade().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_evict_stale_keeps_locked_tracker() {
        let registry = SessionRegistry::with_idle_ttl(MemoryStore::new(), Duration::from_secs(60));
        let tracker = registry.tracker("alice");
        let _in_flight = tracker.lock().await;

        tokio::time::advance(Duration::from_secs(120)).await;

        assert_eq!(registry.evict_stale(), 0);
        assert_eq!(registry.len(), 1);
    }
}
