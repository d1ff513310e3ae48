/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! exec-driver – runs one command to completion and prints its output.
//!
//! Example:
//!   exec-driver "git version"

use anyhow::Result;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "exec-driver", about = "Run a command and print its stdout")]
struct Cli {
    /// Command line to execute (split on whitespace, no shell).
    #[arg(default_value = "git version")]
    command: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    driver::init_tracing();
    let cli = Cli::parse();

    let report = driver::exec(&cli.command).await?;
    print!("{}", report);
    Ok(())
}
