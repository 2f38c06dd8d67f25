//! Source discovery and the coarse dependency graph.
//!
//! The graph is deliberately flat: every source maps to exactly one object,
//! every object depends on its own source plus the whole header set, and the
//! binary depends on every object. There is no per-file include tracking.
//!
//! # Examples
//!
//! ```no_run
//! use rivet::config::ProjectLayout;
//! use rivet::graph::BuildGraph;
//!
//! let graph = BuildGraph::discover(&ProjectLayout::new("."))?;
//! for unit in &graph.units {
//!     println!("{} -> {}", unit.source, unit.object);
//! }
//! # Ok::<(), rivet::graph::GraphError>(())
//! ```

mod entry;
mod error;
mod freshness;

pub use entry::{C_ENTRY, CXX_ENTRY, EntryPoint, validate_entry_point};
pub use error::GraphError;
pub use freshness::{Freshness, needs_relink};

use crate::config::ProjectLayout;
use crate::toolchain::Language;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use tracing::debug;
use walkdir::WalkDir;

/// Extensions treated as headers.
const HEADER_EXTENSIONS: [&str; 4] = ["h", "hh", "hpp", "hxx"];

/// One compilable source and the object it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Source file.
    pub source: Utf8PathBuf,
    /// Object file the source compiles to.
    pub object: Utf8PathBuf,
    /// Language inferred from the extension.
    pub language: Language,
}

/// Sources, headers and the validated entry point of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildGraph {
    /// The program entry point.
    pub entry: EntryPoint,
    /// Compilation units, sorted by source path.
    pub units: Vec<SourceUnit>,
    /// Every header under the include directory, sorted.
    pub headers: Vec<Utf8PathBuf>,
}

impl BuildGraph {
    /// Validate the entry point, then discover sources and headers.
    ///
    /// The entry point is checked first so that configuration errors surface
    /// before the tree is walked or anything is written.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] for a missing or ambiguous entry point, an
    /// object-path collision, or a directory that cannot be scanned.
    pub fn discover(layout: &ProjectLayout) -> Result<Self, GraphError> {
        let entry = validate_entry_point(&layout.src_dir)?;
        let units = discover_units(layout)?;
        let headers = walk_files(&layout.include_dir)?
            .into_iter()
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| HEADER_EXTENSIONS.contains(&ext))
            })
            .collect::<Vec<_>>();
        debug!(
            entry = %entry.path,
            units = units.len(),
            headers = headers.len(),
            "discovered build graph"
        );
        Ok(Self {
            entry,
            units,
            headers,
        })
    }

    /// Object paths of every unit, in unit order.
    pub fn objects(&self) -> impl Iterator<Item = &Utf8Path> {
        self.units.iter().map(|unit| unit.object.as_path())
    }
}

fn discover_units(layout: &ProjectLayout) -> Result<Vec<SourceUnit>, GraphError> {
    let mut owners: HashMap<Utf8PathBuf, Utf8PathBuf> = HashMap::new();
    let mut units = Vec::new();
    for source in walk_files(&layout.src_dir)? {
        let Some(language) = source.extension().and_then(Language::from_extension) else {
            continue;
        };
        let Some(object) = layout.object_for(&source) else {
            continue;
        };
        if let Some(first) = owners.get(&object) {
            return Err(GraphError::ObjectCollision {
                object,
                first: first.clone(),
                second: source,
            });
        }
        owners.insert(object.clone(), source.clone());
        units.push(SourceUnit {
            source,
            object,
            language,
        });
    }
    units.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(units)
}

/// Regular files under `root`, or nothing when `root` is absent.
fn walk_files(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, GraphError> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for walked in WalkDir::new(root).sort_by_file_name() {
        let entry = walked.map_err(|source| GraphError::Walk {
            root: root.to_owned(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = Utf8PathBuf::from_path_buf(entry.into_path())
            .map_err(|path| GraphError::NonUtf8Path { path })?;
        files.push(path);
    }
    files.sort();
    Ok(files)
}
