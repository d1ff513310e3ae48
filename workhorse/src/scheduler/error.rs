/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error type for the periodic [`Scheduler`](super::Scheduler).
//!
//! Errors raised *inside* the work callback are deliberately absent: the
//! scheduler neither catches nor reports them.

use thiserror::Error;

use super::handle::TimerId;

/// Failure returned from [`Scheduler::start()`](super::Scheduler::start).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// No timer facility is reachable from the calling context (no tokio
    /// runtime entered). Fatal at startup.
    #[error("scheduling unavailable: no timer runtime is running in this context")]
    SchedulingUnavailable,

    /// The scheduler already owns a scheduled firing; starting again would
    /// put two timers in flight.
    #[error("scheduler already started (current handle {current})")]
    AlreadyStarted { current: TimerId },

    /// The scheduler was cancelled. Cancellation is terminal.
    #[error("scheduler has been cancelled and cannot be restarted")]
    Cancelled,
}
