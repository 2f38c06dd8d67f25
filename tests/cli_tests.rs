//! CLI parsing and configuration merge tests.
//!
//! These tests validate argument parsing and OrthoConfig layer precedence
//! (defaults, configuration file, `RIVET_*` environment, command line).

use anyhow::{Context, Result, ensure};
use clap::error::ErrorKind;
use ortho_config::{MergeComposer, sanitize_value};
use rivet::cli::{self, Cli, Commands, RunArgs};
use rstest::rstest;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;
use test_support::{EnvLock, EnvVarGuard};

const TOGGLE_VARS: [&str; 3] = ["RIVET_RAYLIB", "RIVET_SQLITE", "RIVET_ASAN"];

fn merged(args: &[&str]) -> Result<Cli> {
    let (parsed, matches) = cli::parse_from(args.iter().copied()).context("parse CLI args")?;
    let merged = cli::merge_with_config(&parsed, &matches).context("merge configuration")?;
    Ok(merged.with_default_command())
}

fn isolated_env() -> Vec<EnvVarGuard> {
    TOGGLE_VARS
        .iter()
        .chain(&[
            "RIVET_JOBS",
            "RIVET_CC",
            "RIVET_CONFIG_PATH",
            "RIVET_VERBOSE",
            "RIVET_PROGRESS",
        ])
        .map(|name| EnvVarGuard::remove(*name))
        .collect()
}

#[rstest]
#[case(&["rivet", "-C", "game", "-j", "8", "--raylib", "run", "--", "--fullscreen"])]
#[case(&["rivet", "--directory", "game", "--jobs", "8", "--raylib", "run", "--fullscreen"])]
fn parses_options_and_trailing_program_arguments(#[case] args: &[&str]) -> Result<()> {
    let (cli, _) = cli::parse_from(args.iter().copied())?;
    ensure!(cli.directory == Some(PathBuf::from("game")));
    ensure!(cli.jobs == Some(8));
    ensure!(cli.raylib && !cli.sqlite && !cli.asan);
    ensure!(
        cli.command
            == Some(Commands::Run(RunArgs {
                args: vec!["--fullscreen".into()]
            }))
    );
    Ok(())
}

#[rstest]
#[case(&["rivet", "-j", "0"], ErrorKind::ValueValidation)]
#[case(&["rivet", "-j", "65"], ErrorKind::ValueValidation)]
#[case(&["rivet", "-j", "many"], ErrorKind::ValueValidation)]
#[case(&["rivet", "--progress", "sometimes"], ErrorKind::InvalidValue)]
#[case(&["rivet", "package"], ErrorKind::InvalidSubcommand)]
fn rejects_invalid_arguments(#[case] args: &[&str], #[case] kind: ErrorKind) -> Result<()> {
    let Err(err) = cli::parse_from(args.iter().copied()) else {
        anyhow::bail!("{args:?} should be rejected");
    };
    ensure!(err.kind() == kind, "expected {kind:?}, got {:?}", err.kind());
    Ok(())
}

#[test]
fn merge_layers_respect_precedence() -> Result<()> {
    let mut composer = MergeComposer::new();
    composer.push_defaults(sanitize_value(&Cli::default())?);
    composer.push_file(json!({ "jobs": 2, "cc": "clang", "sqlite": true }), None);
    composer.push_environment(json!({ "jobs": 3, "raylib": true }));
    composer.push_cli(json!({ "jobs": 4 }));
    let merged = Cli::merge_from_layers(composer.layers())?;
    ensure!(merged.jobs == Some(4), "CLI layer wins");
    ensure!(merged.cc.as_deref() == Some("clang"), "file layer fills gaps");
    ensure!(merged.sqlite && merged.raylib, "toggles union across layers");
    ensure!(!merged.asan, "unset toggles keep their default");
    Ok(())
}

#[rstest]
#[case("1", true)]
#[case("0", false)]
#[case("yes", true)]
#[case("OFF", false)]
#[case("true", true)]
fn environment_toggles_accept_makefile_values(
    #[case] value: &str,
    #[case] expected: bool,
) -> Result<()> {
    let _lock = EnvLock::acquire();
    let _clean = isolated_env();
    let _raylib = EnvVarGuard::set("RIVET_RAYLIB", value);

    let cli = merged(&["rivet"])?;
    ensure!(cli.raylib == expected, "RIVET_RAYLIB={value} gave {}", cli.raylib);
    ensure!(!cli.sqlite && !cli.asan);
    Ok(())
}

#[test]
fn environment_accepts_numeric_logging_and_progress_switches() -> Result<()> {
    let _lock = EnvLock::acquire();
    let _clean = isolated_env();
    let _verbose = EnvVarGuard::set("RIVET_VERBOSE", "1");
    let _progress = EnvVarGuard::set("RIVET_PROGRESS", "0");

    let cli = merged(&["rivet"])?;
    ensure!(cli.verbose, "RIVET_VERBOSE=1 enables verbose logging");
    ensure!(cli.progress == Some(false), "RIVET_PROGRESS=0 disables progress");
    Ok(())
}

/// Point `RIVET_CONFIG_PATH` at a fresh `rivet.toml` holding `contents`.
fn config_file(contents: &str) -> Result<(tempfile::TempDir, EnvVarGuard)> {
    let temp = tempdir().context("create config dir")?;
    let path = temp.path().join("rivet.toml");
    fs::write(&path, contents).context("write rivet.toml")?;
    let text = path.to_str().context("utf8 config path")?;
    let guard = EnvVarGuard::set("RIVET_CONFIG_PATH", text);
    Ok((temp, guard))
}

#[test]
fn config_file_accepts_makefile_style_toggles() -> Result<()> {
    let _lock = EnvLock::acquire();
    let _clean = isolated_env();
    let _config = config_file("asan = 1\nsqlite = 0\nprogress = \"off\"\nverbose = \"yes\"\n")?;

    let cli = merged(&["rivet"])?;
    ensure!(cli.asan, "asan = 1 enables the sanitizer");
    ensure!(!cli.sqlite, "sqlite = 0 leaves SQLite off");
    ensure!(cli.progress == Some(false), "progress = off disables progress");
    ensure!(cli.verbose, "verbose = yes enables verbose logging");
    Ok(())
}

#[test]
fn invalid_config_file_toggle_is_a_configuration_error() -> Result<()> {
    let _lock = EnvLock::acquire();
    let _clean = isolated_env();
    let _config = config_file("raylib = 2\n")?;

    let (parsed, matches) = cli::parse_from(["rivet"])?;
    ensure!(
        cli::merge_with_config(&parsed, &matches).is_err(),
        "raylib = 2 should be rejected"
    );
    Ok(())
}

#[test]
fn invalid_environment_toggle_is_a_configuration_error() -> Result<()> {
    let _lock = EnvLock::acquire();
    let _clean = isolated_env();
    let _asan = EnvVarGuard::set("RIVET_ASAN", "maybe");

    let (parsed, matches) = cli::parse_from(["rivet"])?;
    let Err(err) = cli::merge_with_config(&parsed, &matches) else {
        anyhow::bail!("RIVET_ASAN=maybe should be rejected");
    };
    let text = err.to_string();
    ensure!(
        text.contains("asan") || text.contains("maybe"),
        "error identifies the bad toggle: {text}"
    );
    Ok(())
}

#[test]
fn config_file_then_environment_then_cli() -> Result<()> {
    let _lock = EnvLock::acquire();
    let _clean = isolated_env();
    let temp = tempdir().context("create config dir")?;
    let config_path = temp.path().join("rivet.toml");
    fs::write(
        &config_path,
        "jobs = 2\nsqlite = true\ncc = \"clang\"\nname = \"game\"\n",
    )
    .context("write rivet.toml")?;
    let config_path_text = config_path.to_str().context("utf8 config path")?;
    let _config = EnvVarGuard::set("RIVET_CONFIG_PATH", config_path_text);
    let _jobs = EnvVarGuard::set("RIVET_JOBS", "6");
    let _cc = EnvVarGuard::set("RIVET_CC", "cc-14");

    let cli = merged(&["rivet", "--cc", "tcc", "info"])?;
    ensure!(cli.sqlite, "file enables sqlite");
    ensure!(cli.name.as_deref() == Some("game"), "file sets the binary name");
    ensure!(cli.jobs == Some(6), "environment overrides the file");
    ensure!(cli.cc.as_deref() == Some("tcc"), "command line overrides everything");
    ensure!(cli.command == Some(Commands::Info), "command survives merging");
    Ok(())
}

#[test]
fn command_line_toggle_beats_environment() -> Result<()> {
    let _lock = EnvLock::acquire();
    let _clean = isolated_env();
    let _sqlite = EnvVarGuard::set("RIVET_SQLITE", "0");

    let cli = merged(&["rivet", "--sqlite"])?;
    ensure!(cli.sqlite);
    ensure!(cli.command == Some(Commands::Build), "build is the default command");
    Ok(())
}
