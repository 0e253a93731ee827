// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout timer routes.
//!
//! Each authenticated user gets one tracker from the session registry.
//! Requests for the same user are serialized on that tracker's lock.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{ActivityType, GoalName, SessionSnapshot};
use crate::services::{SharedTracker, TrackerError, ValidationError, WorkoutSaved};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Workout routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/workout", get(get_session).delete(dismiss_session))
        .route("/api/workout/activities", get(list_activities))
        .route("/api/workout/select", post(select_activity))
        .route("/api/workout/toggle", post(toggle_timer))
        .route("/api/workout/reset", post(reset_timer))
        .route("/api/workout/save", post(save_workout))
}

/// The user's tracker, or a validation error if no session was started.
fn active_tracker(state: &AppState, user: &AuthUser) -> Result<SharedTracker<FirestoreDb>> {
    state
        .sessions
        .existing(&user.user_id)
        .ok_or_else(|| TrackerError::from(ValidationError::NoActiveSession).into())
}

/// Current stopwatch state.
async fn get_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<SessionSnapshot> {
    let snapshot = match state.sessions.existing(&user.user_id) {
        Some(tracker) => tracker.lock().await.snapshot(),
        None => SessionSnapshot::idle(),
    };
    Json(snapshot)
}

#[derive(Debug, Deserialize)]
pub struct SelectActivityRequest {
    pub activity: ActivityType,
}

/// Open a fresh session for an activity, discarding any unsaved one.
async fn select_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<SelectActivityRequest>,
) -> Json<SessionSnapshot> {
    let tracker = state.sessions.tracker(&user.user_id);
    let mut tracker = tracker.lock().await;
    tracker.select_activity(req.activity);
    Json(tracker.snapshot())
}

/// Start or pause the stopwatch.
async fn toggle_timer(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SessionSnapshot>> {
    let tracker = active_tracker(&state, &user)?;
    let mut tracker = tracker.lock().await;
    tracker.toggle_running()?;
    Ok(Json(tracker.snapshot()))
}

/// Stop and zero the stopwatch.
async fn reset_timer(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SessionSnapshot>> {
    let tracker = active_tracker(&state, &user)?;
    let mut tracker = tracker.lock().await;
    tracker.reset();
    Ok(Json(tracker.snapshot()))
}

/// Close the session without saving.
async fn dismiss_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> StatusCode {
    state.sessions.remove(&user.user_id);
    StatusCode::NO_CONTENT
}

/// Convert the timed workout into goal progress.
async fn save_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<WorkoutSaved>> {
    let tracker = active_tracker(&state, &user)?;
    let saved = tracker.lock().await.save(&user).await?;

    state.sessions.remove_if_idle(&user.user_id);
    Ok(Json(saved))
}

/// How an activity feeds goals.
#[derive(Serialize, Debug)]
pub struct ActivityInfo {
    pub activity: ActivityType,
    pub label: String,
    pub goal_names: Vec<GoalName>,
    /// Assumed pace for distance goals; absent for duration-based activities
    pub pace_kmh: Option<f64>,
    pub unit: String,
}

async fn list_activities() -> Json<Vec<ActivityInfo>> {
    Json(
        ActivityType::ALL
            .iter()
            .map(|&activity| ActivityInfo {
                activity,
                label: activity.to_string(),
                goal_names: activity.goal_names().to_vec(),
                pace_kmh: activity.pace_kmh(),
                unit: activity.progress_unit().to_string(),
            })
            .collect(),
    )
}
