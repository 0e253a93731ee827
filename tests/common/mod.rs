// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use nutrifit_tracker::config::Config;
use nutrifit_tracker::db::{FirestoreDb, MemoryStore};
use nutrifit_tracker::middleware::auth::create_jwt;
use nutrifit_tracker::models::{Goal, GoalName};
use nutrifit_tracker::routes::create_router;
use nutrifit_tracker::services::TICK_PERIOD;
use nutrifit_tracker::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with an offline database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default())
}

/// Create a test app with an offline database and the given config.
#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, test_db_offline()));
    (create_router(state.clone()), state)
}

/// Bearer header value for a user, signed with the test key.
#[allow(dead_code)]
pub fn bearer_for(user_id: &str) -> String {
    let token = create_jwt(user_id, &Config::test_default().jwt_signing_key)
        .expect("Failed to create test JWT");
    format!("Bearer {}", token)
}

/// Unique user ID so emulator tests don't collide.
#[allow(dead_code)]
pub fn unique_user_id() -> String {
    format!(
        "test-user-{}",
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

/// In-memory store seeded with goals at the given progress.
#[allow(dead_code)]
pub fn store_with_goals(user_id: &str, goals: &[(GoalName, f64)]) -> MemoryStore {
    let store = MemoryStore::new();
    for (name, progress) in goals {
        let mut goal = Goal::new(user_id, *name, "2026-01-01T00:00:00Z");
        goal.progress = *progress;
        store.insert_goal(goal);
    }
    store
}

/// Let the stopwatch run for `secs` seconds of (paused) tokio time.
///
/// Only meaningful inside `#[tokio::test(start_paused = true)]`.
#[allow(dead_code)]
pub async fn run_for(secs: u64) {
    for _ in 0..secs {
        tokio::time::advance(TICK_PERIOD).await;
        tokio::task::yield_now().await;
    }
}
