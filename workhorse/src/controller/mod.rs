/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Stop-command controller.
//!
//! [`Controller::run()`] bootstraps the [`Scheduler`], blocks for exactly one
//! line of input and, if that line is the stop token, cancels the scheduler.
//! Nothing beyond the first line is ever consumed from the input.

use std::io::{self, BufRead};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{EofPolicy, RunnerConfig};
use crate::scheduler::{Scheduler, SchedulerError};

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ControllerError {
    /// End of stream was reached before a command line was delivered.
    #[error("input closed before a command was received")]
    InputClosed,

    #[error("failed to read command: {0}")]
    Io(#[from] io::Error),

    /// Bootstrapping the scheduler failed.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

// ── Outcome ───────────────────────────────────────────────────────────────────

/// What [`Controller::run()`] did with the single command it read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The stop token was received and the scheduler cancelled.
    Stopped,
    /// Input ended before any line and [`EofPolicy::Stop`] cancelled the
    /// scheduler.
    StoppedAtEof,
    /// Input ended before any line; no action taken.
    InputClosed,
    /// Some other command was received; no action taken.
    Ignored { command: String },
}

// ── Controller ────────────────────────────────────────────────────────────────

/// Bridges one line of input into a [`Scheduler::cancel()`] call.
pub struct Controller<R> {
    input: R,
    stop_token: String,
    on_eof: EofPolicy,
}

impl<R: BufRead> Controller<R> {
    pub fn new(input: R, stop_token: impl Into<String>, on_eof: EofPolicy) -> Self {
        Self {
            input,
            stop_token: stop_token.into(),
            on_eof,
        }
    }

    pub fn from_config(input: R, config: &RunnerConfig) -> Self {
        Self::new(input, config.stop_token.clone(), config.on_eof)
    }

    /// Read exactly one line and return it without its trailing `\n`.
    ///
    /// No other byte is stripped: `"STOP\r\n"` yields `"STOP\r"`.  Bytes that
    /// are not valid UTF-8 are replaced with U+FFFD.
    ///
    /// # Errors
    /// * [`ControllerError::InputClosed`] – the stream was already at its end.
    /// * [`ControllerError::Io`] – the read failed.
    pub fn read_command(&mut self) -> Result<String, ControllerError> {
        self.read_line_bytes()
            .map(|line| String::from_utf8_lossy(&line).into_owned())
    }

    fn read_line_bytes(&mut self) -> Result<Vec<u8>, ControllerError> {
        let mut line = Vec::new();
        let n = self.input.read_until(b'\n', &mut line)?;
        if n == 0 {
            return Err(ControllerError::InputClosed);
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        Ok(line)
    }

    /// Start `scheduler`, block for one command and act on it.
    ///
    /// Blocks the calling thread until a line (or end of stream) arrives; call
    /// it from a blocking context such as `tokio::task::spawn_blocking`.
    pub fn run(&mut self, scheduler: &Scheduler) -> Result<Outcome, ControllerError> {
        scheduler.start()?;
        debug!("Waiting for a command on input");

        // Raw bytes: malformed UTF-8 is just another unrecognised command.
        match self.read_line_bytes() {
            Ok(line) if line == self.stop_token.as_bytes() => {
                info!(command = %self.stop_token, "Stop command received");
                scheduler.cancel();
                Ok(Outcome::Stopped)
            }
            Ok(line) => {
                let command = String::from_utf8_lossy(&line).into_owned();
                info!(command = ?command, "Unrecognised command ignored");
                Ok(Outcome::Ignored { command })
            }
            Err(ControllerError::InputClosed) => match self.on_eof {
                EofPolicy::Ignore => {
                    warn!("Input closed before any command; task keeps running");
                    Ok(Outcome::InputClosed)
                }
                EofPolicy::Stop => {
                    info!("Input closed before any command; treating as stop");
                    scheduler.cancel();
                    Ok(Outcome::StoppedAtEof)
                }
            },
            Err(e) => Err(e),
        }
    }

    /// Give back the input, positioned just past the one consumed line.
    pub fn into_inner(self) -> R {
        self.input
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{HandleState, Work};
    use std::io::{Cursor, Read};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::sleep;

    // ── Test helpers ──────────────────────────────────────────────────────────

    fn scheduler() -> (Scheduler, Arc<AtomicU64>) {
        let count = Arc::new(AtomicU64::new(0));
        let c = Arc::clone(&count);
        let work: Work = Arc::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (Scheduler::new(work, Duration::from_secs(1)), count)
    }

    fn controller(input: &str) -> Controller<Cursor<Vec<u8>>> {
        Controller::new(Cursor::new(input.as_bytes().to_vec()), "STOP", EofPolicy::Ignore)
    }

    // ── read_command ──────────────────────────────────────────────────────────

    #[test]
    fn read_command_strips_only_the_line_terminator() {
        assert_eq!(controller("STOP\n").read_command().unwrap(), "STOP");
        assert_eq!(controller("STOP\r\n").read_command().unwrap(), "STOP\r");
        assert_eq!(controller("STOP").read_command().unwrap(), "STOP");
        assert_eq!(controller(" STOP \n").read_command().unwrap(), " STOP ");
        assert_eq!(controller("\n").read_command().unwrap(), "");
    }

    #[test]
    fn read_command_on_empty_input_is_input_closed() {
        let err = controller("").read_command().unwrap_err();
        assert!(matches!(err, ControllerError::InputClosed));
    }

    #[test]
    fn read_command_replaces_invalid_utf8() {
        let mut c = Controller::new(Cursor::new(vec![0xff, b'S', b'\n']), "STOP", EofPolicy::Ignore);
        assert_eq!(c.read_command().unwrap(), "\u{FFFD}S");
    }

    #[test]
    fn only_the_first_line_is_consumed() {
        let mut c = controller("GO\nSTOP\n");
        assert_eq!(c.read_command().unwrap(), "GO");

        let mut rest = String::new();
        c.into_inner().read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "STOP\n");
    }

    // ── run ───────────────────────────────────────────────────────────────────

    #[test]
    fn run_without_runtime_fails_to_bootstrap() {
        let (s, _) = scheduler();
        let err = controller("STOP\n").run(&s).unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Scheduler(SchedulerError::SchedulingUnavailable)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_token_cancels_the_scheduler() {
        let (s, count) = scheduler();
        let outcome = controller("STOP\n").run(&s).unwrap();

        assert_eq!(outcome, Outcome::Stopped);
        assert!(s.is_cancelled());
        assert!(matches!(s.current(), Some((_, HandleState::Cancelled))));

        sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_after_some_firings_halts_further_output() {
        let (s, count) = scheduler();
        let mut c = controller("STOP\n");

        // The command only arrives after three periods have elapsed.
        s.start().unwrap();
        sleep(Duration::from_millis(3500)).await;
        assert_eq!(c.read_command().unwrap(), "STOP");
        assert!(s.cancel());

        sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn non_stop_commands_never_cancel() {
        for input in ["stop\n", "Stop\n", "\n", "CONTINUE\n", "STOP \n", " STOP\n"] {
            let (s, _) = scheduler();
            let outcome = controller(input).run(&s).unwrap();
            assert!(
                matches!(outcome, Outcome::Ignored { .. }),
                "input {:?} gave {:?}",
                input,
                outcome
            );
            assert!(!s.is_cancelled(), "input {:?} cancelled", input);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_utf8_command_is_ignored() {
        let (s, count) = scheduler();
        let mut c = Controller::new(Cursor::new(vec![0xff, b'S', b'\n']), "STOP", EofPolicy::Ignore);
        let outcome = c.run(&s).unwrap();
        assert_eq!(
            outcome,
            Outcome::Ignored {
                command: String::from("\u{FFFD}S")
            }
        );
        assert!(!s.is_cancelled());

        sleep(Duration::from_millis(2500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn crlf_terminated_stop_is_not_the_stop_token() {
        let (s, _) = scheduler();
        let outcome = controller("STOP\r\n").run(&s).unwrap();
        assert_eq!(
            outcome,
            Outcome::Ignored {
                command: String::from("STOP\r")
            }
        );
        assert!(!s.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn unrecognised_command_keeps_task_firing() {
        let (s, count) = scheduler();
        let outcome = controller("GO\n").run(&s).unwrap();
        assert_eq!(
            outcome,
            Outcome::Ignored {
                command: String::from("GO")
            }
        );

        sleep(Duration::from_millis(4500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 4);
        assert!(!s.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_is_ignored_by_default() {
        let (s, count) = scheduler();
        let outcome = controller("").run(&s).unwrap();
        assert_eq!(outcome, Outcome::InputClosed);

        sleep(Duration::from_millis(2500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(!s.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_stops_when_configured() {
        let (s, count) = scheduler();
        let mut c = Controller::new(Cursor::new(Vec::new()), "STOP", EofPolicy::Stop);
        assert_eq!(c.run(&s).unwrap(), Outcome::StoppedAtEof);
        assert!(s.is_cancelled());

        sleep(Duration::from_secs(3)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_stop_token_from_config() {
        let (s, _) = scheduler();
        let config = RunnerConfig {
            stop_token: String::from("HALT"),
            ..RunnerConfig::default()
        };

        let mut c = Controller::from_config(Cursor::new(b"STOP\n".to_vec()), &config);
        assert!(matches!(c.run(&s).unwrap(), Outcome::Ignored { .. }));

        let (s, _) = scheduler();
        let mut c = Controller::from_config(Cursor::new(b"HALT\n".to_vec()), &config);
        assert_eq!(c.run(&s).unwrap(), Outcome::Stopped);
        assert!(s.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn second_run_does_not_double_schedule() {
        let (s, _) = scheduler();
        controller("GO\n").run(&s).unwrap();
        let err = controller("STOP\n").run(&s).unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Scheduler(SchedulerError::AlreadyStarted { .. })
        ));
    }
}
