//! # aglog-cli
//!
//! Command-line front end for the `aglog` rolling file logger.
//!
//! Resolves logger settings from a JSON file or the environment and appends
//! one event, or forces a rotation of the active file.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;

use std::path::PathBuf;

use aglog::{EnvironmentSettings, JsonSettings, Logger, WriteOptions};
use anyhow::Context;
use tracing::debug;

pub use cli::Cli;

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// An event was appended to this file.
    Written(PathBuf),
    /// The active file was moved to this path.
    Rotated(PathBuf),
}

/// Builds the logger described by `cli`.
///
/// # Errors
///
/// Returns an error if the settings file cannot be loaded or a setting is invalid.
pub fn build_logger(cli: &Cli) -> anyhow::Result<Logger> {
    let logger = match &cli.settings {
        Some(path) => {
            let settings = JsonSettings::load(path)
                .with_context(|| format!("loading settings from {}", path.display()))?;
            Logger::from_settings(&cli.prefix, &settings)?
        }
        None => Logger::from_settings(&cli.prefix, &EnvironmentSettings)?,
    };
    debug!(path = %logger.current_path().display(), "logger ready");
    Ok(logger)
}

/// Executes one invocation.
///
/// # Errors
///
/// Returns an error if the logger cannot be built or the file cannot be written.
pub fn run(cli: &Cli) -> anyhow::Result<Outcome> {
    let logger = build_logger(cli)?;

    if cli.rotate {
        let dest = logger.rotate().context("rotating log file")?;
        return Ok(Outcome::Rotated(dest));
    }

    let options = WriteOptions {
        level: cli.level,
        timestamp: cli.no_timestamp.then_some(false),
        ..WriteOptions::default()
    };
    logger
        .write_log_with(&cli.message.join(" "), options)
        .context("writing log event")?;
    Ok(Outcome::Written(logger.current_path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;

    fn write_settings(dir: &std::path::Path, log_path: &std::path::Path) -> PathBuf {
        let settings = serde_json::json!({
            "aglog": {
                "file.path": log_path.to_string_lossy(),
                "level.length": "4",
                "timestamp.visible": "true"
            }
        });
        let path = dir.join("appsettings.json");
        fs::write(&path, settings.to_string()).expect("write settings");
        path
    }

    #[test]
    fn run_writes_event_from_json_settings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log_path = dir.path().join("cli.log");
        let settings = write_settings(dir.path(), &log_path);

        let cli = Cli::parse_from([
            "aglog",
            "--settings",
            settings.to_str().unwrap_or_default(),
            "--level",
            "error",
            "--no-timestamp",
            "disk",
            "full",
        ]);

        let outcome = run(&cli).expect("run");
        assert_eq!(outcome, Outcome::Written(log_path.clone()));
        assert_eq!(fs::read_to_string(&log_path).expect("read"), "[EROR] disk full");
    }

    #[test]
    fn run_rotates_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log_path = dir.path().join("cli.log");
        let settings = write_settings(dir.path(), &log_path);
        fs::write(&log_path, "old line").expect("seed log");

        let cli = Cli::parse_from(["aglog", "-s", settings.to_str().unwrap_or_default(), "--rotate"]);

        let outcome = run(&cli).expect("run");
        let Outcome::Rotated(dest) = outcome else {
            panic!("expected rotation, got {outcome:?}");
        };
        assert!(!log_path.exists());
        assert_eq!(fs::read_to_string(dest).expect("read"), "old line");
    }

    #[test]
    fn run_reports_missing_settings_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.json");
        let cli = Cli::parse_from(["aglog", "-s", missing.to_str().unwrap_or_default(), "x"]);

        let err = run(&cli).err().map(|e| format!("{e:#}")).unwrap_or_default();
        assert!(err.contains("loading settings"), "unexpected error: {err}");
    }
}
