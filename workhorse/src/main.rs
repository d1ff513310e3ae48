/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use workhorse::config::{EofPolicy, RunnerConfig};
use workhorse::controller::Controller;
use workhorse::scheduler::Scheduler;
use workhorse::work;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Workhorse – runs a unit of work once per period until `STOP` arrives on stdin.
///
/// Example:
///   echo STOP | workhorse --period-ms 500
#[derive(Debug, Parser)]
#[command(
    name = "workhorse",
    about = "Fixed-period background task runner",
    long_about = None,
)]
struct Cli {
    /// Path to an optional YAML runner configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Firing period in milliseconds (overrides the configuration file).
    #[arg(short = 'p', long = "period-ms")]
    period_ms: Option<u64>,

    /// Action when stdin closes before any command (overrides the configuration file).
    #[arg(long = "on-eof", value_enum)]
    on_eof: Option<EofPolicy>,
}

fn load_config(cli: &Cli) -> Result<RunnerConfig> {
    let mut config = match &cli.config {
        Some(path) => RunnerConfig::load_from_file(path)?,
        None => RunnerConfig::default(),
    };
    if let Some(period_ms) = cli.period_ms {
        config.period_ms = period_ms;
    }
    if let Some(on_eof) = cli.on_eof {
        config.on_eof = on_eof;
    }
    config.validate()?;
    Ok(config)
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialise structured logging on stderr; stdout carries only status lines.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // ── Load configuration ────────────────────────────────────────────────────
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            process::exit(1);
        }
    };

    info!(
        period_ms   = config.period_ms,
        stop_token  = %config.stop_token,
        on_eof      = ?config.on_eof,
        "Configuration"
    );

    // ── Bootstrap + single command read ───────────────────────────────────────
    let scheduler = Scheduler::new(
        work::status_line(io::stdout(), config.status_line.clone()),
        config.period(),
    );

    let controlled = scheduler.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let mut controller = Controller::from_config(io::stdin().lock(), &config);
        controller.run(&controlled)
    })
    .await;

    match joined {
        Ok(Ok(outcome)) => info!(?outcome, "Controller finished"),
        Ok(Err(e)) => {
            error!("Controller failed: {}", e);
            process::exit(1);
        }
        Err(e) => {
            error!("Controller thread failed: {}", e);
            process::exit(1);
        }
    }

    if scheduler.is_cancelled() {
        return;
    }

    // ── No stop request: keep firing until cancelled, halted or interrupted ───
    info!("Task keeps running; press Ctrl-C to stop");
    tokio::select! {
        _ = scheduler.stopped() => {}
        res = tokio::signal::ctrl_c() => match res {
            Ok(()) => {
                info!("Interrupted");
                scheduler.cancel();
            }
            Err(e) => {
                warn!("Cannot listen for Ctrl-C: {}", e);
                scheduler.stopped().await;
            }
        },
    }

    if scheduler.is_halted() {
        error!("Task stopped because its work failed");
        process::exit(1);
    }
}
