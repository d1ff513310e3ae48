/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Workhorse – fixed-period background task runner.
//!
//! ```text
//! lib.rs
//! ├── scheduler/      – self-rescheduling timer, handles, SchedulerError
//! ├── controller/     – one-line stop command → Scheduler::cancel()
//! ├── config/         – RunnerConfig defaults + optional YAML file
//! └── work            – status-line work unit used by the binary
//! ```

pub mod config;
pub mod controller;
pub mod scheduler;
pub mod work;
