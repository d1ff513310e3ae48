/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! spawn-driver – drives a workhorse child process end to end.
//!
//! Spawns the runner, relays every stdout line as `STDOUT: <line>`, sends
//! the stop token on stdin (no newline, then closes stdin) after
//! `--stop-after-secs`, and prints `End of child process` once the child
//! exits.
//!
//! Example:
//!   spawn-driver --program target/debug/workhorse --stop-after-secs 5

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::process::Command;

use workhorse::config::DEFAULT_STOP_TOKEN;

#[derive(Debug, Parser)]
#[command(name = "spawn-driver", about = "Drive a workhorse child process")]
struct Cli {
    /// Runner executable to spawn.
    #[arg(long, default_value = "workhorse")]
    program: String,

    /// Seconds to wait before sending the stop token.
    #[arg(long, default_value_t = 10)]
    stop_after_secs: u64,

    /// Token written to the child's stdin.
    #[arg(long, default_value = DEFAULT_STOP_TOKEN)]
    stop_token: String,

    /// Extra arguments passed to the runner (after `--`).
    #[arg(last = true)]
    args: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    driver::init_tracing();
    let cli = Cli::parse();

    let mut command = Command::new(&cli.program);
    command.args(&cli.args);

    let mut out = tokio::io::stdout();
    driver::drive(
        command,
        Duration::from_secs(cli.stop_after_secs),
        &cli.stop_token,
        &mut out,
    )
    .await
    .with_context(|| format!("Driving '{}' failed", cli.program))?;

    println!("End of child process");
    Ok(())
}
