//! Application entry point.
//!
//! Parses command-line arguments, merges configuration layers and delegates
//! execution to [`runner::run`].

use rivet::{cli, runner};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt;

fn main() -> ExitCode {
    let (parsed, matches) = match cli::parse_from(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(err) => err.exit(),
    };
    let merged = cli::merge_with_config(&parsed, &matches);
    let verbose = merged.as_ref().map_or(parsed.verbose, |cli| cli.verbose);
    let max_level = if verbose { Level::DEBUG } else { Level::ERROR };
    fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();

    let cli = match merged {
        Ok(cli) => cli.with_default_command(),
        Err(err) => {
            tracing::error!(error = %err, "configuration failed");
            return ExitCode::FAILURE;
        }
    };
    match runner::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "rivet failed");
            ExitCode::FAILURE
        }
    }
}
