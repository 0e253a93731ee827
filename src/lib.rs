// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! NutriFit tracker: goals, daily water and workout timing for the NutriFit app
//!
//! This crate provides the backend API the mobile app talks to. Its core is
//! the workout stopwatch, which turns timed workouts into progress on the
//! user's goals.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{SessionRegistry, SWEEP_PERIOD};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub sessions: SessionRegistry<FirestoreDb>,
}

impl AppState {
    pub fn new(config: Config, db: FirestoreDb) -> Self {
        let sessions = SessionRegistry::with_idle_ttl(db.clone(), config.session_idle_ttl);
        Self {
            config,
            db,
            sessions,
        }
    }

    /// Periodically drop workout sessions nobody has touched for the idle
    /// TTL. The task ends once the state itself is dropped.
    pub fn spawn_session_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let state = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(state) = state.upgrade() else {
                    break;
                };
                let evicted = state.sessions.evict_stale();
                if evicted > 0 {
                    tracing::info!(
                        evicted,
                        remaining = state.sessions.len(),
                        "Swept abandoned workout sessions"
                    );
                }
            }
        })
    }
}
