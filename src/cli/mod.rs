//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands, plus the
//! layered configuration merge (defaults, configuration files, `RIVET_*`
//! environment variables, then command-line flags).

use clap::parser::ValueSource;
use clap::{ArgMatches, Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use ortho_config::declarative::LayerComposition;
use ortho_config::figment::{Figment, providers::Env};
use ortho_config::{
    ConfigDiscovery, MergeComposer, OrthoConfig, OrthoError, OrthoMergeExt, OrthoResult,
    sanitize_value,
};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

mod parsing;

use parsing::{normalise_toggles, parse_jobs};

/// Maximum number of parallel compile jobs.
pub const MAX_JOBS: usize = 64;
const CONFIG_ENV_VAR: &str = "RIVET_CONFIG_PATH";
const ENV_PREFIX: &str = "RIVET_";

/// A build driver for single-binary C and C++ projects.
#[derive(Debug, Parser, Serialize, Deserialize, OrthoConfig)]
#[command(author, version, about, long_about = None)]
#[ortho_config(prefix = "RIVET")]
pub struct Cli {
    /// Project root containing `src/`, `include/` and `resources/`.
    ///
    /// Defaults to the current directory.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Number of parallel compile jobs.
    ///
    /// Values must be between 1 and 64.
    #[arg(short, long, value_name = "N", value_parser = parse_jobs)]
    pub jobs: Option<usize>,

    /// Enable verbose diagnostic logging.
    #[arg(short, long)]
    #[ortho_config(default = false)]
    pub verbose: bool,

    /// Name of the produced binary; defaults to the project directory name.
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Link against raylib.
    #[arg(long)]
    #[ortho_config(default = false)]
    pub raylib: bool,

    /// Link against SQLite.
    #[arg(long)]
    #[ortho_config(default = false)]
    pub sqlite: bool,

    /// Instrument debug builds with AddressSanitizer.
    #[arg(long)]
    #[ortho_config(default = false)]
    pub asan: bool,

    /// C compiler to use instead of the platform default.
    #[arg(long, value_name = "CC")]
    pub cc: Option<String>,

    /// C++ compiler to use instead of the platform default.
    #[arg(long, value_name = "CXX")]
    pub cxx: Option<String>,

    /// Extra flags appended to every compile, split like a shell would.
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub cflags: Option<String>,

    /// Extra flags appended to the link, split like a shell would.
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub ldflags: Option<String>,

    /// Host identifier to configure for instead of the detected one.
    #[arg(long = "host-os", value_name = "ID")]
    pub host_os: Option<String>,

    /// Force the progress display on or off.
    #[arg(long)]
    pub progress: Option<bool>,

    /// Optional subcommand to execute; defaults to `build` when omitted.
    ///
    /// `OrthoConfig` merging ignores this field; CLI parsing supplies it.
    #[serde(skip)]
    #[command(subcommand)]
    #[ortho_config(skip_cli)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Apply the default command if none was specified.
    #[must_use]
    pub fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Build);
        }
        self
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            directory: None,
            jobs: None,
            verbose: false,
            name: None,
            raylib: false,
            sqlite: false,
            asan: false,
            cc: None,
            cxx: None,
            cflags: None,
            ldflags: None,
            host_os: None,
            progress: None,
            command: None,
        }
        .with_default_command()
    }
}

/// Arguments accepted by the `run` command.
#[derive(Debug, Args, PartialEq, Eq, Clone, Default, Serialize, Deserialize)]
pub struct RunArgs {
    /// Arguments forwarded to the program.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    #[serde(default)]
    pub args: Vec<String>,
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Commands {
    /// Compile stale objects and link the binary (the default).
    Build,

    /// Build, then execute the binary from inside the output directory.
    Run(RunArgs),

    /// Clean, then build with the release profile and no sanitizer.
    Release,

    /// Remove the generated object and binary directories.
    Clean,

    /// Print the resolved configuration without building.
    Info,
}

/// Parse CLI arguments.
///
/// Returns both the parsed CLI struct and the `ArgMatches` required for
/// configuration merging.
///
/// # Errors
///
/// Returns a `clap::Error` when parsing fails.
pub fn parse_from<I, T>(iter: I) -> Result<(Cli, ArgMatches), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = Cli::command();
    let matches = command.try_get_matches_from_mut(iter)?;
    // Clone matches before from_arg_matches_mut consumes the values.
    let matches_for_merge = matches.clone();
    let mut matches_for_parse = matches;
    let cli = Cli::from_arg_matches_mut(&mut matches_for_parse)
        .map_err(|clap_err| clap_err.with_cmd(&command))?;
    Ok((cli, matches_for_merge))
}

/// Return the prefixed environment provider for CLI configuration.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
}

/// Build configuration discovery rooted in the optional project directory.
fn config_discovery(directory: Option<&PathBuf>) -> ConfigDiscovery {
    let mut builder = ConfigDiscovery::builder("rivet").env_var(CONFIG_ENV_VAR);
    if let Some(dir) = directory {
        builder = builder.clear_project_roots().add_project_root(dir);
    }
    builder.build()
}

/// Return `true` when no CLI overrides were supplied.
///
/// The merge pipeline treats an empty JSON object as "no overrides".
fn is_empty_value(value: &serde_json::Value) -> bool {
    matches!(value, serde_json::Value::Object(map) if map.is_empty())
}

fn validation_error(key: &str, message: String) -> Arc<OrthoError> {
    Arc::new(OrthoError::Validation {
        key: key.to_owned(),
        message,
    })
}

fn environment_layer() -> OrthoResult<serde_json::Value> {
    let mut value = Figment::from(env_provider().split("__"))
        .extract::<serde_json::Value>()
        .into_ortho_merge()?;
    normalise_toggles(&mut value).map_err(|err| validation_error(err.key, err.message))?;
    Ok(value)
}

fn cli_overrides_from_matches(cli: &Cli, matches: &ArgMatches) -> OrthoResult<serde_json::Value> {
    let value = sanitize_value(cli)?;
    let mut map = match value {
        serde_json::Value::Object(map) => map,
        other => {
            return Err(validation_error(
                "cli",
                format!("expected parsed CLI values to serialize to an object, got {other:?}"),
            ));
        }
    };

    map.remove("command");
    for field in ["verbose", "raylib", "sqlite", "asan", "progress"] {
        if matches.value_source(field) != Some(ValueSource::CommandLine) {
            map.remove(field);
        }
    }

    Ok(serde_json::Value::Object(map))
}

/// Merge configuration layers over the parsed CLI values.
///
/// # Errors
///
/// Returns an [`ortho_config::OrthoError`] if layer composition or merging
/// fails, including when a boolean key in a configuration file or `RIVET_*`
/// variable is not a recognised toggle.
pub fn merge_with_config(cli: &Cli, matches: &ArgMatches) -> OrthoResult<Cli> {
    let command = cli.command.clone();
    let mut errors = Vec::new();
    let mut composer = MergeComposer::with_capacity(4);

    match sanitize_value(&Cli::default()) {
        Ok(value) => composer.push_defaults(value),
        Err(err) => errors.push(err),
    }

    let discovery = config_discovery(cli.directory.as_ref());
    let mut file_layers = discovery.compose_layers();
    errors.append(&mut file_layers.required_errors);
    if file_layers.value.is_empty() {
        errors.append(&mut file_layers.optional_errors);
    }
    for layer in file_layers.value {
        let path = layer.path().map(ToOwned::to_owned);
        let mut value = layer.into_value();
        match normalise_toggles(&mut value) {
            Ok(()) => composer.push_file(value, path),
            Err(err) => errors.push(validation_error(err.key, err.message)),
        }
    }

    match environment_layer() {
        Ok(value) => composer.push_environment(value),
        Err(err) => errors.push(err),
    }

    match cli_overrides_from_matches(cli, matches) {
        Ok(value) if !is_empty_value(&value) => composer.push_cli(value),
        Ok(_) => {}
        Err(err) => errors.push(err),
    }

    let composition = LayerComposition::new(composer.layers(), errors);
    let mut merged = composition.into_merge_result(Cli::merge_from_layers)?;
    merged.command = command;
    Ok(merged)
}
