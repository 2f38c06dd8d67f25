//! Build pipeline status reporting.
//!
//! This module provides a [`StatusReporter`] trait plus concrete reporters for
//! plain line-oriented output and standard terminal progress output. Standard
//! mode uses `indicatif::MultiProgress` to keep stage summaries persistent
//! while the pipeline advances.
//!
//! Compiles run on worker threads, so reporters must be shareable across
//! threads.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// Report pipeline progress to the user.
pub trait StatusReporter: Send + Sync {
    /// A stage has started.
    fn report_stage(&self, stage: PipelineStage);

    /// One object finished compiling; `done` of `total` are complete.
    fn report_unit_compiled(&self, done: usize, total: usize, source: &str);

    /// The pipeline finished successfully.
    fn report_complete(&self, summary: &str);
}

/// Enumerates the pipeline stages in reporting order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    /// Stage 1: validate the entry point and discover sources.
    ResolveGraph = 1,
    /// Stage 2: create the object and binary directories.
    PrepareDirectories = 2,
    /// Stage 3: copy resources beside the binary.
    CopyResources = 3,
    /// Stage 4: compile stale objects.
    CompileObjects = 4,
    /// Stage 5: link the binary.
    LinkBinary = 5,
}

/// The total number of pipeline stages reported during a build.
pub const PIPELINE_STAGE_COUNT: u32 = 5;

impl PipelineStage {
    /// All pipeline stages in reporting order.
    pub const ALL: [Self; 5] = [
        Self::ResolveGraph,
        Self::PrepareDirectories,
        Self::CopyResources,
        Self::CompileObjects,
        Self::LinkBinary,
    ];

    /// 1-based index of this stage within the pipeline.
    #[must_use]
    pub const fn index(self) -> u32 {
        self as u32
    }

    /// Human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ResolveGraph => "Resolving sources",
            Self::PrepareDirectories => "Preparing directories",
            Self::CopyResources => "Copying resources",
            Self::CompileObjects => "Compiling objects",
            Self::LinkBinary => "Linking binary",
        }
    }

    /// `[n/total] description`.
    #[must_use]
    pub fn label(self) -> String {
        format!(
            "[{}/{}] {}",
            self.index(),
            PIPELINE_STAGE_COUNT,
            self.description()
        )
    }
}

/// Plain reporter: writes one labelled line per event to stderr.
pub struct TextReporter;

impl StatusReporter for TextReporter {
    fn report_stage(&self, stage: PipelineStage) {
        // Status output failures must not abort the build.
        drop(writeln!(io::stderr(), "{}", stage.label()));
    }

    fn report_unit_compiled(&self, done: usize, total: usize, source: &str) {
        drop(writeln!(io::stderr(), "  ({done}/{total}) {source}"));
    }

    fn report_complete(&self, summary: &str) {
        drop(writeln!(io::stderr(), "{summary}"));
    }
}

/// Silent reporter: emits nothing.
pub struct SilentReporter;

impl StatusReporter for SilentReporter {
    fn report_stage(&self, _stage: PipelineStage) {}
    fn report_unit_compiled(&self, _done: usize, _total: usize, _source: &str) {}
    fn report_complete(&self, _summary: &str) {}
}

#[derive(Debug)]
struct IndicatifState {
    bars: Vec<ProgressBar>,
    running: Option<PipelineStage>,
    completed: bool,
    is_hidden: bool,
}

/// Standard reporter backed by `indicatif::MultiProgress`.
pub struct IndicatifReporter {
    // Owns the draw target the bars render through.
    _progress: MultiProgress,
    state: Mutex<IndicatifState>,
}

impl IndicatifReporter {
    /// Construct a reporter with one persistent line per stage.
    #[must_use]
    pub fn new() -> Self {
        let progress = MultiProgress::with_draw_target(ProgressDrawTarget::stderr_with_hz(12));
        progress.set_move_cursor(false);
        let style = ProgressStyle::with_template("{msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let bars = PipelineStage::ALL
            .iter()
            .map(|stage| {
                let bar = progress.add(ProgressBar::new(1));
                bar.set_style(style.clone());
                bar.set_message(format!("{} (pending)", stage.label()));
                bar
            })
            .collect();

        Self {
            state: Mutex::new(IndicatifState {
                is_hidden: progress.is_hidden(),
                bars,
                running: None,
                completed: false,
            }),
            _progress: progress,
        }
    }

    fn set_message(state: &IndicatifState, stage: PipelineStage, message: String, finish: bool) {
        if state.is_hidden {
            if finish {
                drop(writeln!(io::stderr(), "{message}"));
            }
            return;
        }
        let Some(bar) = usize::try_from(stage.index() - 1)
            .ok()
            .and_then(|index| state.bars.get(index))
        else {
            return;
        };
        if finish {
            bar.finish_with_message(message);
        } else {
            bar.set_message(message);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IndicatifState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for IndicatifReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IndicatifReporter {
    fn drop(&mut self) {
        let mut state = self.lock();
        if state.completed {
            return;
        }
        if let Some(stage) = state.running.take() {
            Self::set_message(&state, stage, format!("{} (failed)", stage.label()), true);
        }
    }
}

impl StatusReporter for IndicatifReporter {
    fn report_stage(&self, stage: PipelineStage) {
        let mut state = self.lock();
        if let Some(previous) = state.running
            && previous != stage
        {
            Self::set_message(&state, previous, format!("{} (done)", previous.label()), true);
        }
        Self::set_message(&state, stage, format!("{} (running)", stage.label()), false);
        state.running = Some(stage);
    }

    fn report_unit_compiled(&self, done: usize, total: usize, source: &str) {
        let state = self.lock();
        Self::set_message(
            &state,
            PipelineStage::CompileObjects,
            format!(
                "{} ({done}/{total}) {source}",
                PipelineStage::CompileObjects.label()
            ),
            false,
        );
    }

    fn report_complete(&self, summary: &str) {
        let mut state = self.lock();
        if let Some(stage) = state.running.take() {
            Self::set_message(&state, stage, format!("{} (done)", stage.label()), true);
        }
        state.completed = true;
        drop(writeln!(io::stderr(), "{summary}"));
    }
}

/// Pick a reporter for the requested output style.
#[must_use]
pub fn make_reporter(progress: bool, verbose: bool) -> Box<dyn StatusReporter> {
    match (progress, verbose) {
        (false, _) => Box::new(SilentReporter),
        (true, true) => Box::new(TextReporter),
        (true, false) => Box::new(IndicatifReporter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn pipeline_stage_count_matches_stage_array() {
        let stage_count = u32::try_from(PipelineStage::ALL.len()).unwrap_or(0);
        assert_eq!(PIPELINE_STAGE_COUNT, stage_count);
    }

    #[rstest]
    #[case(PipelineStage::ResolveGraph, "[1/5] Resolving sources")]
    #[case(PipelineStage::CompileObjects, "[4/5] Compiling objects")]
    #[case(PipelineStage::LinkBinary, "[5/5] Linking binary")]
    fn labels_carry_position(#[case] stage: PipelineStage, #[case] expected: &str) {
        assert_eq!(stage.label(), expected);
    }

    #[test]
    fn reporters_cross_threads() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn StatusReporter>();
        assert_send_sync::<IndicatifReporter>();
    }

    #[test]
    fn indicatif_reporter_tracks_running_stage() {
        let reporter = IndicatifReporter::new();
        reporter.report_stage(PipelineStage::ResolveGraph);
        reporter.report_stage(PipelineStage::CompileObjects);
        reporter.report_unit_compiled(1, 2, "src/main.c");
        assert_eq!(reporter.lock().running, Some(PipelineStage::CompileObjects));
        reporter.report_complete("built");
        let state = reporter.lock();
        assert!(state.completed);
        assert_eq!(state.running, None);
    }
}
