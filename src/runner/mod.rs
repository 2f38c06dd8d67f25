//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! resolves the build configuration once and dispatches the requested
//! command.

mod error;
mod info;

pub use error::RunnerError;
pub use info::write_info;

use crate::cli::{Cli, Commands, RunArgs};
use crate::config::BuildConfig;
use crate::orchestrator::{self, BuildReport, Orchestrator};
use crate::process;
use crate::profile::BuildProfile;
use crate::status::{StatusReporter, make_reporter};
use anyhow::{Context, Result};
use std::io;
use std::process::Command;
use tracing::info;

/// Environment variable read by the AddressSanitizer runtime.
pub const ASAN_OPTIONS_ENV: &str = "ASAN_OPTIONS";
/// Sanitizer options applied to `run` when the caller has set none.
pub const DEFAULT_ASAN_OPTIONS: &str = "detect_leaks=1";

/// Execute the parsed [`Cli`] command.
///
/// # Errors
///
/// Returns an error if configuration cannot be resolved, the build fails,
/// or the program started by `run` exits unsuccessfully.
pub fn run(cli: &Cli) -> Result<()> {
    let config = BuildConfig::from_cli(cli).context("resolving build configuration")?;
    let reporter = || make_reporter(cli.progress.unwrap_or(true), cli.verbose);
    match cli.command.clone().unwrap_or(Commands::Build) {
        Commands::Build => handle_build(&config, reporter().as_ref()).map(drop),
        Commands::Run(args) => handle_run(&config, &args, reporter().as_ref()),
        Commands::Release => handle_release(config, reporter().as_ref()).map(drop),
        Commands::Clean => handle_clean(&config),
        Commands::Info => {
            write_info(&config, &mut io::stdout().lock()).context("writing configuration")
        }
    }
}

/// Build `config`, returning what was done.
///
/// # Errors
///
/// Returns an error if the build fails.
pub fn handle_build(config: &BuildConfig, reporter: &dyn StatusReporter) -> Result<BuildReport> {
    let mut orchestrator = Orchestrator::new(config, reporter);
    let report = orchestrator
        .build()
        .with_context(|| format!("building {}", config.binary_path()))?;
    info!(
        compiled = report.compiled.len(),
        linked = report.linked,
        resources = report.resources_copied,
        "build finished"
    );
    Ok(report)
}

/// Clean, then build with the release profile and without the sanitizer.
///
/// # Errors
///
/// Returns an error if cleaning or the build fails.
pub fn handle_release(config: BuildConfig, reporter: &dyn StatusReporter) -> Result<BuildReport> {
    let release = config.with_profile(BuildProfile::Release);
    orchestrator::clean(&release.layout).context("cleaning before release build")?;
    handle_build(&release, reporter)
}

fn handle_clean(config: &BuildConfig) -> Result<()> {
    let removed = orchestrator::clean(&config.layout).context("cleaning build outputs")?;
    info!(removed = removed.len(), "clean finished");
    Ok(())
}

/// Build, then run the binary from inside its output directory.
fn handle_run(config: &BuildConfig, args: &RunArgs, reporter: &dyn StatusReporter) -> Result<()> {
    let report = handle_build(config, reporter)?;
    let asan_options_set = std::env::var_os(ASAN_OPTIONS_ENV).is_some();
    let mut cmd = program_command(config, &report, args, asan_options_set);
    let status = process::run_interactive(&mut cmd).map_err(|source| RunnerError::SpawnProgram {
        program: report.binary.clone(),
        source,
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(RunnerError::ProgramFailed {
            program: report.binary,
            status,
        }
        .into())
    }
}

fn program_command(
    config: &BuildConfig,
    report: &BuildReport,
    args: &RunArgs,
    asan_options_set: bool,
) -> Command {
    let mut cmd = Command::new(report.binary.as_std_path());
    cmd.args(&args.args).current_dir(config.layout.bin_dir.as_std_path());
    if config.features.asan && !asan_options_set {
        cmd.env(ASAN_OPTIONS_ENV, DEFAULT_ASAN_OPTIONS);
    }
    cmd
}
