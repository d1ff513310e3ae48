/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Timer handles – one per scheduled firing.
//!
//! A handle is never reused: every firing installs a fresh handle for the
//! next period, and the superseded one is dropped.
//!
//! ```text
//!   Pending ──(timer expires)──► Fired ──► successor handle installed
//!      │
//!      └──(cancel)──► Cancelled   (terminal)
//! ```

use std::fmt;
use std::time::Duration;

use tokio::task::JoinHandle;

// ── Identifiers & states ──────────────────────────────────────────────────────

/// Identifier of one scheduled firing.
///
/// Ids increase monotonically per [`Scheduler`](super::Scheduler), so a
/// firing can tell whether the handle it belongs to is still the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub(crate) u64);

impl TimerId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Lifecycle state of a single timer handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Waiting for its delay to elapse.
    Pending,
    /// The delay elapsed and the work was (or is being) invoked.
    Fired,
    /// Cancelled before it fired. Terminal.
    Cancelled,
}

impl fmt::Display for HandleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HandleState::Pending => "pending",
            HandleState::Fired => "fired",
            HandleState::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

// ── TimerHandle ───────────────────────────────────────────────────────────────

/// The live reference to one scheduled firing, owned by the scheduler state.
#[derive(Debug)]
pub(crate) struct TimerHandle {
    pub(crate) id: TimerId,
    pub(crate) delay: Duration,
    pub(crate) state: HandleState,
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub(crate) fn new(id: TimerId, delay: Duration, task: JoinHandle<()>) -> Self {
        Self {
            id,
            delay,
            state: HandleState::Pending,
            task,
        }
    }

    /// `Pending → Fired`. Returns `false` if the handle already left `Pending`.
    pub(crate) fn mark_fired(&mut self) -> bool {
        if self.state != HandleState::Pending {
            return false;
        }
        self.state = HandleState::Fired;
        true
    }

    /// `Pending → Cancelled` and abort the sleeping task.
    ///
    /// A handle that already fired is left alone: its work is in flight and
    /// is not interrupted.
    pub(crate) fn cancel(&mut self) -> bool {
        if self.state != HandleState::Pending {
            return false;
        }
        self.state = HandleState::Cancelled;
        self.task.abort();
        true
    }
}
