// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stopwatch clock and the periodic task that advances it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Tick period of the workout stopwatch.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Elapsed time and run flag, shared between a session and its ticker.
#[derive(Debug, Default)]
pub struct Stopwatch {
    pub elapsed_seconds: u64,
    pub running: bool,
}

/// Handle to a stopwatch shared with a ticker task.
pub type SharedStopwatch = Arc<Mutex<Stopwatch>>;

/// Lock a stopwatch, recovering from poisoning (the data is two plain fields).
pub fn lock(stopwatch: &SharedStopwatch) -> MutexGuard<'_, Stopwatch> {
    stopwatch.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owned periodic task that adds one second per tick while `running` is set.
///
/// The task is aborted when the handle is dropped. Callers clear `running`
/// under the lock before dropping, so no tick lands after a pause returns.
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Start ticking; the first increment happens one `period` from now.
    ///
    /// Only whole periods are counted. A partial second run before a pause
    /// is dropped, and the next start begins a fresh second.
    pub fn start(stopwatch: SharedStopwatch, period: Duration) -> Self {
        // Anchor to the call time, not to when the task is first polled.
        let first_tick = Instant::now() + period;

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(first_tick, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

            loop {
                interval.tick().await;
                let still_running = {
                    let mut clock = lock(&stopwatch);
                    if clock.running {
                        clock.elapsed_seconds += 1;
                    }
                    clock.running
                };
                if !still_running {
                    break;
                }
            }

            tracing::trace!("Stopwatch ticker stopped");
        });

        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
