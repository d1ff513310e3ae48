/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Fixed-period, self-rescheduling task scheduler.
//!
//! [`Scheduler`] owns at most one pending [`TimerHandle`] at any instant.
//! When the handle fires, the scheduler invokes the configured [`Work`] and
//! then, from within the same firing, installs a fresh handle for the next
//! period.  The result is an unbounded periodic sequence of invocations that
//! stops only when [`Scheduler::cancel()`] is called.
//!
//! # Concurrency model
//!
//! | Thread of control | Touches |
//! |---|---|
//! | tokio timer task (one per handle) | `Pending → Fired`, then reschedule |
//! | controller / caller thread | `cancel()` |
//!
//! Both paths go through a single mutex, so "fire → reschedule" and
//! "cancel" are serialised:
//!
//! * a cancel that lands while a handle is still `Pending` aborts it and no
//!   firing happens;
//! * a cancel that lands while work is in flight does not interrupt that
//!   work, but the reschedule step observes the cancellation and no
//!   successor handle is created.
//!
//! `cancel()` never waits for in-flight work.
//!
//! The work itself runs on tokio's blocking pool, so a slow or stalled work
//! unit (e.g. a blocked stdout pipe) never occupies a runtime worker.  If the
//! work panics the scheduler is *halted*: nothing is rescheduled and
//! [`Scheduler::stopped()`] resolves, the same as after a cancel.
//!
//! # Example
//! ```rust,ignore
//! let scheduler = Scheduler::new(work, Duration::from_secs(1));
//! scheduler.start()?;
//! // ... later, from any thread
//! scheduler.cancel();
//! ```

pub mod error;
pub mod handle;

pub use error::SchedulerError;
pub use handle::{HandleState, TimerId};

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinError;
use tracing::{debug, error, info};

use handle::TimerHandle;

// ── Work unit ─────────────────────────────────────────────────────────────────

/// The unit of work invoked on every firing, on a blocking-pool thread.
///
/// A panic in the work is not recovered from: it halts the scheduler.
pub type Work = Arc<dyn Fn() + Send + Sync + 'static>;

// ── Internal state ────────────────────────────────────────────────────────────

/// Everything guarded by the scheduler mutex.
#[derive(Debug)]
struct State {
    /// The handle for the current (or in-flight) firing.
    current: Option<TimerHandle>,
    next_id: u64,
    cancelled: bool,
    /// Set when the work panicked; terminal like `cancelled`.
    halted: bool,
    firings: u64,
}

struct Inner {
    work: Work,
    period: Duration,
    state: Mutex<State>,
    stopped: watch::Sender<bool>,
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

/// Runs one [`Work`] unit per fixed period until cancelled.
///
/// Cheap to clone; every clone drives the same timer.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    pub fn new(work: Work, period: Duration) -> Self {
        let (stopped, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                work,
                period,
                state: Mutex::new(State {
                    current: None,
                    next_id: 1,
                    cancelled: false,
                    halted: false,
                    firings: 0,
                }),
                stopped,
            }),
        }
    }

    /// Schedule the first firing one full period from now.
    ///
    /// Must be called from within a tokio runtime context (an async task or a
    /// `spawn_blocking` thread).
    ///
    /// # Errors
    /// * [`SchedulerError::SchedulingUnavailable`] – no runtime to host the
    ///   timer.
    /// * [`SchedulerError::AlreadyStarted`] – a firing is already scheduled.
    /// * [`SchedulerError::Cancelled`] – the scheduler was cancelled or halted.
    pub fn start(&self) -> Result<TimerId, SchedulerError> {
        let runtime = Handle::try_current().map_err(|_| SchedulerError::SchedulingUnavailable)?;

        let mut state = self.lock();
        if state.cancelled || state.halted {
            return Err(SchedulerError::Cancelled);
        }
        if let Some(current) = &state.current {
            return Err(SchedulerError::AlreadyStarted {
                current: current.id,
            });
        }

        let id = self.schedule_locked(&mut state, &runtime);
        info!(
            timer = %id,
            period_ms = self.inner.period.as_millis() as u64,
            "Scheduler started"
        );
        Ok(id)
    }

    /// Cancel the pending firing and stop all future rescheduling.
    ///
    /// Returns `true` if this call performed the cancellation, `false` if the
    /// scheduler was already cancelled.  Work that is already executing runs
    /// to completion; this call does not wait for it.
    pub fn cancel(&self) -> bool {
        let mut state = self.lock();
        if state.cancelled {
            return false;
        }
        state.cancelled = true;

        let (timer, aborted) = match state.current.as_mut() {
            Some(current) => (Some(current.id), current.cancel()),
            None => (None, false),
        };
        let firings = state.firings;
        drop(state);

        self.inner.stopped.send_replace(true);
        info!(
            timer = ?timer,
            aborted_pending = aborted,
            firings = firings,
            "Scheduler cancelled"
        );
        true
    }

    /// Resolves once the scheduler has been cancelled or halted by a panicking
    /// work unit.
    pub async fn stopped(&self) {
        let mut rx = self.inner.stopped.subscribe();
        // The sender lives as long as `self`, so this only returns on `true`.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// The current handle's id and state, if one was ever scheduled.
    pub fn current(&self) -> Option<(TimerId, HandleState)> {
        self.lock().current.as_ref().map(|h| (h.id, h.state))
    }

    /// Number of firings so far.
    pub fn firings(&self) -> u64 {
        self.lock().firings
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// `true` if the work panicked and the firing chain ended.
    pub fn is_halted(&self) -> bool {
        self.lock().halted
    }

    pub fn period(&self) -> Duration {
        self.inner.period
    }

    // ── Firing path ───────────────────────────────────────────────────────────

    /// Spawn the timer task for the next firing and install its handle,
    /// replacing (and dropping) the previous one.
    fn schedule_locked(&self, state: &mut State, runtime: &Handle) -> TimerId {
        let id = TimerId(state.next_id);
        state.next_id = state.next_id.wrapping_add(1);

        let period = self.inner.period;
        let scheduler = self.clone();
        let task = runtime.spawn(async move {
            tokio::time::sleep(period).await;
            scheduler.fire(id).await;
        });

        // The task cannot observe the state before this assignment: it has to
        // take the same lock first.
        state.current = Some(TimerHandle::new(id, period, task));
        id
    }

    async fn fire(&self, id: TimerId) {
        let firing = {
            let mut state = self.lock();
            let claimed = match state.current.as_mut() {
                Some(current) if current.id == id => current.mark_fired(),
                _ => false,
            };
            if !claimed || state.cancelled {
                debug!(timer = %id, "Stale or cancelled timer expired; skipping");
                return;
            }
            state.firings = state.firings.saturating_add(1);
            state.firings
        };

        debug!(timer = %id, firing = firing, "Timer fired");
        let work = Arc::clone(&self.inner.work);
        if let Err(e) = tokio::task::spawn_blocking(move || work()).await {
            self.halt(id, &e);
            return;
        }

        let mut state = self.lock();
        if state.cancelled {
            debug!(timer = %id, "Cancelled during firing; not rescheduling");
            return;
        }
        match Handle::try_current() {
            Ok(runtime) => {
                let next = self.schedule_locked(&mut state, &runtime);
                debug!(timer = %id, next = %next, "Rescheduled");
            }
            Err(e) => error!(timer = %id, "Cannot reschedule: {}", e),
        }
    }

    /// The work for `id` did not complete; end the firing chain for good.
    fn halt(&self, id: TimerId, cause: &JoinError) {
        let firings = {
            let mut state = self.lock();
            state.halted = true;
            state.firings
        };
        self.inner.stopped.send_replace(true);
        error!(timer = %id, firings = firings, "Work failed, scheduler halted: {}", cause);
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Scheduler")
            .field("period", &self.inner.period)
            .field(
                "current",
                &state.current.as_ref().map(|h| (h.id, h.state, h.delay)),
            )
            .field("cancelled", &state.cancelled)
            .field("halted", &state.halted)
            .field("firings", &state.firings)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────────────────────────
