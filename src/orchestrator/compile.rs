//! Parallel compilation of stale units.

use super::BuildError;
use crate::config::BuildConfig;
use crate::graph::SourceUnit;
use crate::invocation::Invocation;
use crate::process;
use crate::status::StatusReporter;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Compile `units` on a pool of `config.jobs` workers.
///
/// Stops scheduling new units once one fails and returns that failure.
pub(super) fn compile_units(
    config: &BuildConfig,
    units: &[&SourceUnit],
    reporter: &dyn StatusReporter,
) -> Result<(), BuildError> {
    if units.is_empty() {
        return Ok(());
    }
    let pool = ThreadPoolBuilder::new()
        .num_threads(config.jobs.unwrap_or(0))
        .build()
        .map_err(BuildError::ThreadPool)?;
    let total = units.len();
    let done = AtomicUsize::new(0);
    pool.install(|| {
        units.par_iter().try_for_each(|unit| {
            compile_unit(config, unit)?;
            let finished = done.fetch_add(1, Ordering::Relaxed).saturating_add(1);
            reporter.report_unit_compiled(finished, total, unit.source.as_str());
            Ok(())
        })
    })
}

pub(super) fn compile_unit(config: &BuildConfig, unit: &SourceUnit) -> Result<(), BuildError> {
    let invocation = Invocation::compile(config, unit);
    debug!(command = %invocation, "compiling {}", unit.source);
    let status = process::run_captured(&mut invocation.to_command()).map_err(|source| {
        BuildError::Spawn {
            program: invocation.program.clone(),
            source,
        }
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(BuildError::CompileFailed {
            unit: unit.source.clone(),
            status,
        })
    }
}
