//! Program entry-point validation.

use super::GraphError;
use crate::toolchain::Language;
use camino::{Utf8Path, Utf8PathBuf};

/// File name of the C entry point.
pub const C_ENTRY: &str = "main.c";
/// File name of the C++ entry point.
pub const CXX_ENTRY: &str = "main.cpp";

/// The single source file that defines `main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    /// Path of the entry source.
    pub path: Utf8PathBuf,
    /// Its language, which picks the link driver.
    pub language: Language,
}

/// Require exactly one of `main.c` and `main.cpp` directly under `src_dir`.
///
/// # Errors
///
/// Returns [`GraphError::NoEntryPoint`] when neither exists and
/// [`GraphError::AmbiguousEntryPoint`] when both do.
pub fn validate_entry_point(src_dir: &Utf8Path) -> Result<EntryPoint, GraphError> {
    let c = src_dir.join(C_ENTRY);
    let cpp = src_dir.join(CXX_ENTRY);
    match (c.is_file(), cpp.is_file()) {
        (true, false) => Ok(EntryPoint {
            path: c,
            language: Language::C,
        }),
        (false, true) => Ok(EntryPoint {
            path: cpp,
            language: Language::Cxx,
        }),
        (false, false) => Err(GraphError::NoEntryPoint { c, cpp }),
        (true, true) => Err(GraphError::AmbiguousEntryPoint { c, cpp }),
    }
}
