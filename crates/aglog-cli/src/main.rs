//! `aglog` binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use aglog_cli::{run, Cli, Outcome};

fn main() -> ExitCode {
    // Diagnostics go to stderr so stdout stays scriptable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(Outcome::Written(path)) => {
            tracing::debug!(path = %path.display(), "event written");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Rotated(dest)) => {
            println!("{}", dest.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
