//! Command-line argument parsing with clap.

use std::path::PathBuf;

use aglog::{LogEventLevel, DEFAULT_PREFIX};
use clap::Parser;

/// Append an event to a rolling log file.
#[derive(Parser, Debug, Clone)]
#[command(name = "aglog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON settings file; settings come from `AGLOG__*` environment
    /// variables when omitted.
    ///
    /// Setting names contain `.` or `-`, which shells cannot `export`, so
    /// set them through `env`, e.g. `env 'AGLOG__FILE.PATH=/tmp/app.log' aglog hi`.
    #[arg(short, long, env = "AGLOG_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Settings prefix.
    #[arg(short, long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Event level; the configured minimum level when omitted.
    #[arg(short, long, value_parser = parse_level)]
    pub level: Option<LogEventLevel>,

    /// Leave the timestamp off this event.
    #[arg(long)]
    pub no_timestamp: bool,

    /// Move the current log file aside instead of writing.
    #[arg(long, conflicts_with = "message")]
    pub rotate: bool,

    /// Message text; multiple words are joined with spaces.
    #[arg(required_unless_present = "rotate")]
    pub message: Vec<String>,
}

fn parse_level(value: &str) -> Result<LogEventLevel, String> {
    value.parse().map_err(|e: aglog::LogError| e.to_string())
}
