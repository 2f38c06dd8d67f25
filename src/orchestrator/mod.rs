//! Build sequencing.
//!
//! An [`Orchestrator`] drives one build through a fixed series of states:
//!
//! ```text
//! Idle -> DirectoriesReady -> AssetsCopied -> ObjectsBuilt -> Linked -> Done
//! ```
//!
//! Any failure moves it to [`BuildState::Failed`]. The graph, including the
//! entry-point check, is resolved while still `Idle`, so a misconfigured
//! project never creates a directory or runs a compiler.

mod assets;
mod compile;
mod error;

pub use error::BuildError;

use crate::config::{BuildConfig, ProjectLayout};
use crate::graph::{BuildGraph, Freshness, SourceUnit, needs_relink};
use crate::invocation::Invocation;
use crate::process;
use crate::status::{PipelineStage, StatusReporter};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tracing::{debug, info};

/// Progress of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// Nothing has been written yet.
    Idle,
    /// `obj/` and `bin/` exist.
    DirectoriesReady,
    /// Resources are in place beside the binary.
    AssetsCopied,
    /// Every object is up to date.
    ObjectsBuilt,
    /// The binary is up to date.
    Linked,
    /// The build finished.
    Done,
    /// A step failed; later steps did not run.
    Failed,
}

impl BuildState {
    /// The state that follows this one on success, if any.
    #[must_use]
    pub const fn successor(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::DirectoriesReady),
            Self::DirectoriesReady => Some(Self::AssetsCopied),
            Self::AssetsCopied => Some(Self::ObjectsBuilt),
            Self::ObjectsBuilt => Some(Self::Linked),
            Self::Linked => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }
}

/// What a build did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Sources that were recompiled, in source order.
    pub compiled: Vec<Utf8PathBuf>,
    /// Whether the binary was relinked.
    pub linked: bool,
    /// Whether resources were copied.
    pub resources_copied: bool,
    /// Path of the binary.
    pub binary: Utf8PathBuf,
}

impl BuildReport {
    /// One-line summary for status output.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.compiled.is_empty() && !self.linked {
            format!("{} is up to date", self.binary)
        } else {
            format!(
                "built {} ({} compiled{})",
                self.binary,
                self.compiled.len(),
                if self.linked { ", relinked" } else { "" }
            )
        }
    }
}

/// Drives one configuration through the build states.
pub struct Orchestrator<'a> {
    config: &'a BuildConfig,
    reporter: &'a dyn StatusReporter,
    state: BuildState,
}

impl<'a> Orchestrator<'a> {
    /// Prepare a build of `config`, reporting through `reporter`.
    #[must_use]
    pub const fn new(config: &'a BuildConfig, reporter: &'a dyn StatusReporter) -> Self {
        Self {
            config,
            reporter,
            state: BuildState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> BuildState {
        self.state
    }

    /// Bring the binary up to date.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] on configuration errors, filesystem failures,
    /// or when a compile or the link fails. The state is then
    /// [`BuildState::Failed`].
    pub fn build(&mut self) -> Result<BuildReport, BuildError> {
        self.state = BuildState::Idle;
        let result = self.drive();
        match &result {
            Ok(report) => {
                self.advance();
                self.reporter.report_complete(&report.summary());
            }
            Err(err) => {
                debug!(state = ?self.state, error = %err, "build failed");
                self.state = BuildState::Failed;
            }
        }
        result
    }

    fn drive(&mut self) -> Result<BuildReport, BuildError> {
        let config = self.config;
        let layout = &config.layout;

        self.reporter.report_stage(PipelineStage::ResolveGraph);
        let graph = BuildGraph::discover(layout)?;
        let freshness = Freshness::from_headers(&graph.headers)?;

        self.reporter.report_stage(PipelineStage::PrepareDirectories);
        prepare_directories(layout, &graph)?;
        self.advance();

        self.reporter.report_stage(PipelineStage::CopyResources);
        let resources_copied = assets::copy_resources(layout)?;
        self.advance();

        self.reporter.report_stage(PipelineStage::CompileObjects);
        let mut stale = Vec::new();
        for unit in &graph.units {
            let rebuild = freshness.needs_rebuild(unit)?;
            debug!(source = %unit.source, rebuild, "staleness");
            if rebuild {
                stale.push(unit);
            }
        }
        compile::compile_units(config, &stale, self.reporter)?;
        self.advance();

        self.reporter.report_stage(PipelineStage::LinkBinary);
        let binary = config.binary_path();
        let linked = needs_relink(&binary, graph.objects())?;
        if linked {
            self.link(&graph)?;
        } else {
            debug!(binary = %binary, "binary is up to date");
        }
        self.advance();

        Ok(BuildReport {
            compiled: stale
                .into_iter()
                .map(|unit: &SourceUnit| unit.source.clone())
                .collect(),
            linked,
            resources_copied,
            binary,
        })
    }

    fn link(&self, graph: &BuildGraph) -> Result<(), BuildError> {
        let invocation = Invocation::link(self.config, graph);
        debug!(command = %invocation, "linking");
        let status = process::run_streaming(&mut invocation.to_command()).map_err(|source| {
            BuildError::Spawn {
                program: invocation.program.clone(),
                source,
            }
        })?;
        if status.success() {
            Ok(())
        } else {
            Err(BuildError::LinkFailed {
                binary: self.config.binary_path(),
                status,
            })
        }
    }

    fn advance(&mut self) {
        if let Some(next) = self.state.successor() {
            info!(from = ?self.state, to = ?next, "build state");
            self.state = next;
        }
    }
}

fn prepare_directories(layout: &ProjectLayout, graph: &BuildGraph) -> Result<(), BuildError> {
    let object_dirs = graph.objects().filter_map(Utf8Path::parent);
    for dir in layout.generated_dirs().into_iter().chain(object_dirs) {
        fs::create_dir_all(dir).map_err(|source| BuildError::CreateDirectory {
            path: dir.to_owned(),
            source,
        })?;
    }
    Ok(())
}

/// Remove the generated directories, returning those that existed.
///
/// # Errors
///
/// Returns [`BuildError::Remove`] when a directory exists but cannot be
/// removed.
pub fn clean(layout: &ProjectLayout) -> Result<Vec<Utf8PathBuf>, BuildError> {
    let mut removed = Vec::new();
    for dir in layout.generated_dirs() {
        if !dir.exists() {
            continue;
        }
        fs::remove_dir_all(dir).map_err(|source| BuildError::Remove {
            path: dir.to_owned(),
            source,
        })?;
        info!(dir = %dir, "removed");
        removed.push(dir.to_owned());
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(BuildState::Idle, Some(BuildState::DirectoriesReady))]
    #[case(BuildState::ObjectsBuilt, Some(BuildState::Linked))]
    #[case(BuildState::Linked, Some(BuildState::Done))]
    #[case(BuildState::Done, None)]
    #[case(BuildState::Failed, None)]
    fn states_advance_in_order(#[case] state: BuildState, #[case] expected: Option<BuildState>) {
        assert_eq!(state.successor(), expected);
    }

    #[test]
    fn summary_distinguishes_no_op_builds() {
        let mut report = BuildReport {
            compiled: Vec::new(),
            linked: false,
            resources_copied: false,
            binary: Utf8PathBuf::from("bin/app"),
        };
        assert_eq!(report.summary(), "bin/app is up to date");
        report.compiled.push(Utf8PathBuf::from("src/main.c"));
        report.linked = true;
        assert_eq!(report.summary(), "built bin/app (1 compiled, relinked)");
    }

    #[test]
    fn clean_without_outputs_removes_nothing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8");
        let layout = ProjectLayout::new(root);
        assert!(clean(&layout).expect("clean").is_empty());
    }
}
