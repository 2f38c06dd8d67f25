//! Timestamp-based invalidation.
//!
//! An object is stale when it is missing, older than its source, or older
//! than the newest header. Every header counts for every object, so a header
//! edit rebuilds everything: false rebuilds are possible, false skips are
//! not.

use super::{GraphError, SourceUnit};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::ErrorKind;
use std::time::SystemTime;

/// Staleness oracle for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freshness {
    newest_header: Option<SystemTime>,
}

impl Freshness {
    /// Record the newest modification time among `headers`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Metadata`] when a header cannot be inspected.
    pub fn from_headers(headers: &[Utf8PathBuf]) -> Result<Self, GraphError> {
        let mut newest_header = None;
        for header in headers {
            let modified = required_mtime(header)?;
            newest_header = newest_header.max(Some(modified));
        }
        Ok(Self { newest_header })
    }

    /// Whether `unit` must be recompiled.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Metadata`] when the source or object cannot be
    /// inspected.
    pub fn needs_rebuild(&self, unit: &SourceUnit) -> Result<bool, GraphError> {
        let Some(object) = optional_mtime(&unit.object)? else {
            return Ok(true);
        };
        let source = required_mtime(&unit.source)?;
        if object < source {
            return Ok(true);
        }
        Ok(self.newest_header.is_some_and(|header| object < header))
    }
}

/// Whether `binary` must be relinked from `objects`.
///
/// # Errors
///
/// Returns [`GraphError::Metadata`] when an object is missing or unreadable.
pub fn needs_relink<'a, I>(binary: &Utf8Path, objects: I) -> Result<bool, GraphError>
where
    I: IntoIterator<Item = &'a Utf8Path>,
{
    let Some(linked) = optional_mtime(binary)? else {
        return Ok(true);
    };
    for object in objects {
        if required_mtime(object)? > linked {
            return Ok(true);
        }
    }
    Ok(false)
}

fn optional_mtime(path: &Utf8Path) -> Result<Option<SystemTime>, GraphError> {
    match path.metadata().and_then(|meta| meta.modified()) {
        Ok(time) => Ok(Some(time)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(GraphError::Metadata {
            path: path.to_owned(),
            source,
        }),
    }
}

fn required_mtime(path: &Utf8Path) -> Result<SystemTime, GraphError> {
    path.metadata()
        .and_then(|meta| meta.modified())
        .map_err(|source| GraphError::Metadata {
            path: path.to_owned(),
            source,
        })
}
