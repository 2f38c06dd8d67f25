//! Error types for the runner module.
//!
//! This submodule isolates derive-macro-affected code to scope lint suppressions
//! narrowly. The `unused_assignments` lint fires in some Rust versions due to
//! thiserror/miette derive macro expansion.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros. The unused_assignments lint fires in some
// Rust versions but not others. Since `#[expect]` fails when the lint doesn't
// fire, and `unfulfilled_lint_expectations` cannot be expected, we must use
// `#[allow]` here.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::Utf8PathBuf;
use miette::Diagnostic;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors raised while executing a command.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// The built program could not be started.
    #[error("failed to start {program}")]
    #[diagnostic(code(rivet::runner::spawn_program))]
    SpawnProgram {
        /// Program path.
        program: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The built program exited unsuccessfully.
    #[error("{program} exited with {status}")]
    #[diagnostic(code(rivet::runner::program_failed))]
    ProgramFailed {
        /// Program path.
        program: Utf8PathBuf,
        /// Its exit status.
        status: ExitStatus,
    },
}
