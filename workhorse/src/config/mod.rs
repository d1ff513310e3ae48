/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Runner configuration loading.
//!
//! Nothing here is required: [`RunnerConfig::default()`] reproduces the
//! built-in behaviour (one firing per second, `"Working Hard.."`, `"STOP"`).
//! An optional YAML file may override any subset of the fields:
//! ```yaml
//! runner:
//!   period_ms: 1000
//!   stop_token: "STOP"
//!   status_line: "Working Hard.."
//!   on_eof: ignore   # or: stop
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

// ── Defaults ──────────────────────────────────────────────────────────────────

pub const DEFAULT_PERIOD_MS: u64 = 1000;
pub const DEFAULT_STOP_TOKEN: &str = "STOP";
pub const DEFAULT_STATUS_LINE: &str = "Working Hard..";

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Deserialize)]
struct RunnerConfigFile {
    #[serde(default)]
    runner: Option<RunnerConfigEntry>,
}

/// Runner fields as they appear in the YAML file; all optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RunnerConfigEntry {
    period_ms: Option<u64>,
    stop_token: Option<String>,
    status_line: Option<String>,
    on_eof: Option<EofPolicy>,
}

// ── Public data structures ────────────────────────────────────────────────────

/// What the controller does when the input stream ends before any line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EofPolicy {
    /// Take no action; the task keeps firing.
    #[default]
    Ignore,
    /// Treat end-of-stream as a stop request.
    Stop,
}

/// Effective runner settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub period_ms: u64,
    /// Exact, case-sensitive command that cancels the task.
    pub stop_token: String,
    /// Line written to stdout on every firing (a newline is appended).
    pub status_line: String,
    pub on_eof: EofPolicy,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            period_ms: DEFAULT_PERIOD_MS,
            stop_token: String::from(DEFAULT_STOP_TOKEN),
            status_line: String::from(DEFAULT_STATUS_LINE),
            on_eof: EofPolicy::default(),
        }
    }
}

impl RunnerConfig {
    /// Parses `path`, layering its values over the defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, the YAML is structurally
    /// invalid, or the resulting configuration fails [`validate`](Self::validate).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading runner configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let file: RunnerConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        let entry = file.runner.unwrap_or_default();
        let defaults = Self::default();
        let config = Self {
            period_ms: entry.period_ms.unwrap_or(defaults.period_ms),
            stop_token: entry.stop_token.unwrap_or(defaults.stop_token),
            status_line: entry.status_line.unwrap_or(defaults.status_line),
            on_eof: entry.on_eof.unwrap_or(defaults.on_eof),
        };
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        debug!(?config, "Runner configuration loaded");
        Ok(config)
    }

    /// Rejects settings the runner cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.period_ms == 0 {
            bail!("period_ms must be > 0");
        }
        Ok(())
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn defaults_match_builtin_behaviour() {
        let cfg = RunnerConfig::default();
        assert_eq!(cfg.period(), Duration::from_secs(1));
        assert_eq!(cfg.stop_token, "STOP");
        assert_eq!(cfg.status_line, "Working Hard..");
        assert_eq!(cfg.on_eof, EofPolicy::Ignore);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn load_full_yaml() {
        let yaml = r#"
runner:
  period_ms: 250
  stop_token: "HALT"
  status_line: "tick"
  on_eof: stop
"#;
        let f = yaml_tempfile(yaml);
        let cfg = RunnerConfig::load_from_file(f.path()).unwrap();
        assert_eq!(cfg.period(), Duration::from_millis(250));
        assert_eq!(cfg.stop_token, "HALT");
        assert_eq!(cfg.status_line, "tick");
        assert_eq!(cfg.on_eof, EofPolicy::Stop);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let f = yaml_tempfile("runner:\n  period_ms: 50\n");
        let cfg = RunnerConfig::load_from_file(f.path()).unwrap();
        assert_eq!(cfg.period_ms, 50);
        assert_eq!(cfg.stop_token, DEFAULT_STOP_TOKEN);
        assert_eq!(cfg.on_eof, EofPolicy::Ignore);
    }

    #[test]
    fn missing_runner_section_is_all_defaults() {
        let f = yaml_tempfile("{}\n");
        let cfg = RunnerConfig::load_from_file(f.path()).unwrap();
        assert_eq!(cfg, RunnerConfig::default());
    }

    #[test]
    fn zero_period_is_rejected() {
        let f = yaml_tempfile("runner:\n  period_ms: 0\n");
        let err = RunnerConfig::load_from_file(f.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("period_ms must be > 0"));
    }

    #[test]
    fn unknown_eof_policy_is_rejected() {
        let f = yaml_tempfile("runner:\n  on_eof: maybe\n");
        assert!(RunnerConfig::load_from_file(f.path()).is_err());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let f = yaml_tempfile("runner:\n  periodms: 10\n");
        assert!(RunnerConfig::load_from_file(f.path()).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RunnerConfig::load_from_file(Path::new("/nonexistent/runner.yaml")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/runner.yaml"));
    }
}
