// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout stopwatch and goal progress updates.
//!
//! Handles the core workflow:
//! 1. Select an activity and time it (start/pause/reset)
//! 2. On save, convert elapsed minutes into goal progress
//! 3. Look up the user's goals fed by that activity
//! 4. Increment all of them in one all-or-nothing batch

use crate::db::GoalStore;
use crate::error::AppError;
use crate::models::goal::join_goal_names;
use crate::models::session::format_elapsed;
use crate::models::{ActivityType, GoalName, SessionSnapshot, SessionState};
use crate::services::ticker::{self, SharedStopwatch, Ticker, TICK_PERIOD};
use serde::Serialize;

/// Source of the signed-in user's ID.
pub trait CurrentUser {
    fn current_user_id(&self) -> Option<&str>;
}

impl CurrentUser for Option<String> {
    fn current_user_id(&self) -> Option<&str> {
        self.as_deref()
    }
}

/// Local precondition failures; nothing was sent to the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("no active session")]
    NoActiveSession,

    #[error("zero duration")]
    ZeroDuration,

    #[error("not signed in")]
    NotSignedIn,
}

/// Errors from [`WorkoutProgressTracker::save`].
///
/// The session is left untouched for every variant, so the caller can retry.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("No matching goal; create one of: {}", join_goal_names(.goal_names))]
    NoMatchingGoal { goal_names: Vec<GoalName> },

    #[error("Failed to save workout progress: {0}")]
    Persistence(String),
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Validation(e) => AppError::Validation(e.to_string()),
            TrackerError::NoMatchingGoal { goal_names } => {
                AppError::GoalRequired(goal_names.iter().map(ToString::to_string).collect())
            }
            TrackerError::Persistence(msg) => AppError::Database(msg),
        }
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutSaved {
    pub activity: ActivityType,
    pub elapsed_seconds: u64,
    /// Progress added to each goal
    pub delta: f64,
    pub unit: String,
    pub updated_goals: usize,
    pub goal_names: Vec<GoalName>,
}

/// Timer state for one in-progress workout.
struct ActivitySession {
    activity: ActivityType,
    stopwatch: SharedStopwatch,
    ticker: Option<Ticker>,
    started: bool,
}

impl ActivitySession {
    fn new(activity: ActivityType) -> Self {
        Self {
            activity,
            stopwatch: SharedStopwatch::default(),
            ticker: None,
            started: false,
        }
    }

    fn elapsed_seconds(&self) -> u64 {
        ticker::lock(&self.stopwatch).elapsed_seconds
    }

    fn is_running(&self) -> bool {
        ticker::lock(&self.stopwatch).running
    }

    fn start(&mut self) {
        ticker::lock(&self.stopwatch).running = true;
        self.ticker = Some(Ticker::start(self.stopwatch.clone(), TICK_PERIOD));
        self.started = true;
    }

    /// Stop ticking. Clearing `running` under the lock first means the
    /// ticker cannot add another second once this returns.
    fn pause(&mut self) {
        ticker::lock(&self.stopwatch).running = false;
        self.ticker = None;
    }

    fn reset(&mut self) {
        self.pause();
        ticker::lock(&self.stopwatch).elapsed_seconds = 0;
        self.started = false;
    }

    fn state(&self) -> SessionState {
        if self.is_running() {
            SessionState::Running
        } else if self.started {
            SessionState::Paused
        } else {
            SessionState::Selected
        }
    }
}

impl Drop for ActivitySession {
    fn drop(&mut self) {
        self.pause();
    }
}

/// Single-activity stopwatch that turns timed workouts into goal progress.
///
/// Owns at most one session at a time. Must be used inside a Tokio runtime
/// since the tick runs as a spawned task.
pub struct WorkoutProgressTracker<S> {
    store: S,
    session: Option<ActivitySession>,
}

impl<S: GoalStore> WorkoutProgressTracker<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            session: None,
        }
    }

    /// Start a fresh session, discarding any previous one unsaved.
    pub fn select_activity(&mut self, activity: ActivityType) {
        if let Some(previous) = self.session.take() {
            tracing::debug!(
                activity = %previous.activity,
                elapsed_seconds = previous.elapsed_seconds(),
                "Discarding unsaved workout session"
            );
        }
        tracing::debug!(activity = %activity, "Workout activity selected");
        self.session = Some(ActivitySession::new(activity));
    }

    /// Start or pause the stopwatch. Returns whether it is now running.
    pub fn toggle_running(&mut self) -> Result<bool, TrackerError> {
        let session = self
            .session
            .as_mut()
            .ok_or(ValidationError::NoActiveSession)?;

        if session.is_running() {
            session.pause();
        } else {
            session.start();
        }

        let running = session.is_running();
        tracing::debug!(
            activity = %session.activity,
            running,
            elapsed_seconds = session.elapsed_seconds(),
            "Workout timer toggled"
        );
        Ok(running)
    }

    /// Stop the stopwatch and zero it, keeping the selected activity.
    pub fn reset(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.reset();
            tracing::debug!(activity = %session.activity, "Workout timer reset");
        }
    }

    /// Close the session without saving.
    pub fn dismiss(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!(activity = %session.activity, "Workout session dismissed");
        }
    }

    pub fn activity(&self) -> Option<ActivityType> {
        self.session.as_ref().map(|s| s.activity)
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.session
            .as_ref()
            .map_or(0, ActivitySession::elapsed_seconds)
    }

    pub fn is_running(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(ActivitySession::is_running)
    }

    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::Idle, ActivitySession::state)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let Some(session) = self.session.as_ref() else {
            return SessionSnapshot::idle();
        };

        let elapsed_seconds = session.elapsed_seconds();
        SessionSnapshot {
            state: session.state(),
            activity: Some(session.activity),
            elapsed_seconds,
            running: session.is_running(),
            display: format_elapsed(elapsed_seconds),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Convert the timed workout into progress on every matching goal.
    ///
    /// On success the session is closed. On any error it is kept as-is
    /// (including a running timer) so the user can retry without re-timing.
    pub async fn save<U: CurrentUser>(&mut self, user: &U) -> Result<WorkoutSaved, TrackerError> {
        let session = self
            .session
            .as_ref()
            .ok_or(ValidationError::NoActiveSession)?;
        let activity = session.activity;
        let elapsed_seconds = session.elapsed_seconds();
        if elapsed_seconds == 0 {
            return Err(ValidationError::ZeroDuration.into());
        }
        let user_id = user
            .current_user_id()
            .ok_or(ValidationError::NotSignedIn)?;

        let minutes = elapsed_seconds as f64 / 60.0;
        let delta = activity.progress_for_minutes(minutes);
        let names = activity.goal_names();

        let goals = self
            .store
            .find_goals(user_id, names)
            .await
            .map_err(persistence_error)?;

        if goals.is_empty() {
            tracing::warn!(
                user_id,
                activity = %activity,
                goals = %join_goal_names(names),
                "No goal matches workout"
            );
            return Err(TrackerError::NoMatchingGoal {
                goal_names: names.to_vec(),
            });
        }

        let goal_ids: Vec<String> = goals.iter().map(|g| g.id.clone()).collect();
        if let Err(e) = self
            .store
            .increment_progress(user_id, &goal_ids, delta)
            .await
        {
            tracing::error!(
                user_id,
                activity = %activity,
                error = %e,
                "Failed to apply workout progress"
            );
            return Err(persistence_error(e));
        }

        self.dismiss();

        tracing::info!(
            user_id,
            activity = %activity,
            elapsed_seconds,
            delta,
            updated_goals = goal_ids.len(),
            "Workout saved"
        );

        Ok(WorkoutSaved {
            activity,
            elapsed_seconds,
            delta,
            unit: activity.progress_unit().to_string(),
            updated_goals: goal_ids.len(),
            goal_names: goals.iter().map(|g| g.goal_name).collect(),
        })
    }
}

fn persistence_error(err: AppError) -> TrackerError {
    match err {
        AppError::Database(msg) => TrackerError::Persistence(msg),
        other => TrackerError::Persistence(other.to_string()),
    }
}
