/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Shared logic for the manual driver binaries.
//!
//! * [`drive`] – spawn a runner, relay its stdout, send the stop token.
//! * [`exec`] – run one command to completion and report its stdout.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Initialise `tracing` on stderr, level from `RUST_LOG` (default `info`).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Split a whitespace-separated command line into program and arguments.
///
/// No shell quoting is interpreted. Returns `None` for a blank line.
pub fn split_command(line: &str) -> Option<(String, Vec<String>)> {
    let mut parts = line.split_whitespace().map(String::from);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

// ── spawn-driver ──────────────────────────────────────────────────────────────

/// Copy every line of `reader` to `out` as `STDOUT: <line>`, flushing each.
///
/// Returns the number of lines relayed once `reader` reaches end of stream.
pub async fn relay_lines<R, W>(reader: R, out: &mut W) -> io::Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut relayed = 0u64;
    while let Some(line) = lines.next_line().await? {
        out.write_all(format!("STDOUT: {}\n", line).as_bytes()).await?;
        out.flush().await?;
        relayed += 1;
    }
    Ok(relayed)
}

/// Write `token` (no newline) to `stdin`, then shut it down.
///
/// Dropping the writer afterwards closes the pipe, so the child sees end of
/// stream right after the token.
pub async fn send_stop<W>(mut stdin: W, token: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    stdin.write_all(token.as_bytes()).await?;
    stdin.flush().await?;
    stdin.shutdown().await
}

/// Spawn `command` with piped stdio, relay its stdout to `out`, send `token`
/// after `stop_after`, and wait for it to exit.
///
/// If the child closes its stdout before `stop_after` elapses, the token is
/// never sent.
pub async fn drive<W>(
    mut command: Command,
    stop_after: Duration,
    token: &str,
    out: &mut W,
) -> Result<ExitStatus>
where
    W: AsyncWrite + Unpin,
{
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .context("Failed to spawn child")?;
    info!(pid = ?child.id(), "Child spawned");

    let stdout = child.stdout.take().context("child stdout was not captured")?;
    let stdin = child.stdin.take().context("child stdin was not captured")?;

    let stop = async move {
        tokio::time::sleep(stop_after).await;
        info!(token = %token, "Sending stop token");
        send_stop(stdin, token).await
    };

    let relay = relay_lines(BufReader::new(stdout), out);
    tokio::pin!(relay);

    tokio::select! {
        relayed = &mut relay => {
            let relayed = relayed.context("Reading child stdout failed")?;
            debug!(lines = relayed, "Child closed stdout before the stop token");
        }
        sent = stop => {
            if let Err(e) = sent {
                warn!("Sending stop token failed: {}", e);
            }
            let relayed = relay.await.context("Reading child stdout failed")?;
            debug!(lines = relayed, "Relay finished");
        }
    }

    let status = child.wait().await.context("Failed to wait for child")?;
    info!(%status, "Child exited");
    Ok(status)
}

// ── exec-driver ───────────────────────────────────────────────────────────────

/// Run `command_line` and return `"<command_line> finished\n"` followed by
/// its captured stdout.
///
/// # Errors
/// The line is blank, the program cannot be run, or it exits unsuccessfully.
pub async fn exec(command_line: &str) -> Result<String> {
    let (program, args) = split_command(command_line).context("empty command")?;
    debug!(program = %program, args = ?args, "Executing");

    let output = Command::new(&program)
        .args(&args)
        .output()
        .await
        .with_context(|| format!("Failed to run '{}'", command_line))?;

    if !output.status.success() {
        bail!(
            "'{}' exited with {}: {}",
            command_line,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim_end()
        );
    }

    Ok(format!(
        "{} finished\n{}",
        command_line,
        String::from_utf8_lossy(&output.stdout)
    ))
}
