//! Error types for the orchestrator module.
//!
//! This submodule isolates derive-macro-affected code to scope lint suppressions
//! narrowly.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use crate::graph::GraphError;
use camino::Utf8PathBuf;
use miette::Diagnostic;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors raised while driving a build.
#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    /// The project is misconfigured.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    /// An output directory could not be created.
    #[error("failed to create directory {path}")]
    #[diagnostic(code(rivet::build::create_directory))]
    CreateDirectory {
        /// Directory being created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The resources tree could not be copied.
    #[error("failed to copy resource {}", path.display())]
    #[diagnostic(
        code(rivet::build::copy_resources),
        help("check permissions on resources/ and bin/")
    )]
    CopyResources {
        /// File or directory being copied.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A generated directory could not be removed.
    #[error("failed to remove {path}")]
    #[diagnostic(code(rivet::build::remove))]
    Remove {
        /// Directory being removed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A compiler or linker could not be started.
    #[error("failed to run {program}")]
    #[diagnostic(
        code(rivet::build::spawn),
        help("check that the compiler is installed and on PATH, or set --cc/--cxx")
    )]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A compilation unit failed to compile.
    #[error("compiling {unit} failed ({status})")]
    #[diagnostic(code(rivet::build::compile_failed))]
    CompileFailed {
        /// Source that failed.
        unit: Utf8PathBuf,
        /// Compiler exit status.
        status: ExitStatus,
    },

    /// Linking the binary failed.
    #[error("linking {binary} failed ({status})")]
    #[diagnostic(
        code(rivet::build::link_failed),
        help("a missing library shows up here; check the enabled features")
    )]
    LinkFailed {
        /// Binary being produced.
        binary: Utf8PathBuf,
        /// Linker exit status.
        status: ExitStatus,
    },

    /// The compile worker pool could not be started.
    #[error("failed to start the compile worker pool")]
    #[diagnostic(code(rivet::build::thread_pool))]
    ThreadPool(#[source] rayon::ThreadPoolBuildError),
}
