//! Error types for the graph module.
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

use camino::Utf8PathBuf;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors detected before anything is compiled.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    /// Neither `main.c` nor `main.cpp` exists.
    #[error("no program entry point: expected {c} or {cpp}")]
    #[diagnostic(
        code(rivet::graph::no_entry_point),
        help("add a main.c or a main.cpp to the source directory")
    )]
    NoEntryPoint {
        /// Expected C entry point.
        c: Utf8PathBuf,
        /// Expected C++ entry point.
        cpp: Utf8PathBuf,
    },

    /// Both `main.c` and `main.cpp` exist.
    #[error("ambiguous program entry point: both {c} and {cpp} exist")]
    #[diagnostic(
        code(rivet::graph::ambiguous_entry_point),
        help("keep exactly one of main.c and main.cpp")
    )]
    AmbiguousEntryPoint {
        /// C entry point found.
        c: Utf8PathBuf,
        /// C++ entry point found.
        cpp: Utf8PathBuf,
    },

    /// Two sources would compile to the same object file.
    #[error("{first} and {second} both compile to {object}")]
    #[diagnostic(
        code(rivet::graph::object_collision),
        help("rename one of the sources so their stems differ")
    )]
    ObjectCollision {
        /// Shared object path.
        object: Utf8PathBuf,
        /// Source discovered first.
        first: Utf8PathBuf,
        /// Source discovered second.
        second: Utf8PathBuf,
    },

    /// A project path is not valid UTF-8.
    #[error("path {} is not valid UTF-8", path.display())]
    #[diagnostic(code(rivet::graph::non_utf8_path))]
    NonUtf8Path {
        /// Offending path.
        path: PathBuf,
    },

    /// Walking a project directory failed.
    #[error("failed to scan {root}")]
    #[diagnostic(code(rivet::graph::walk))]
    Walk {
        /// Directory being scanned.
        root: Utf8PathBuf,
        /// Underlying walk error.
        #[source]
        source: walkdir::Error,
    },

    /// A timestamp could not be read.
    #[error("failed to read modification time of {path}")]
    #[diagnostic(code(rivet::graph::metadata))]
    Metadata {
        /// File being inspected.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
