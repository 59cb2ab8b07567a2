//! Diff computation stage.
//!
//! Builds the engine from configuration and runs it over two snapshots.

use super::PipelineError;
use crate::config::DiffConfig;
use crate::diff::{DiffEngine, DiffInput, DiffResult};
use anyhow::Result;

/// Run the configured differ over two snapshots.
pub fn compute_diff(config: &DiffConfig, old: &DiffInput, new: &DiffInput) -> Result<DiffResult> {
    let quiet = config.behavior.quiet;
    if !quiet {
        tracing::info!("Computing {} diff...", config.kind);
    }

    let engine = DiffEngine::new()
        .with_correlation(config.correlation.rules())
        .with_failure_policy(config.behavior.failure_policy());

    let result = engine
        .diff(old, new)
        .map_err(|e| PipelineError::DiffFailed { source: e.into() })?;

    if !quiet {
        let summary = result.summary();
        tracing::info!(
            "Diff complete: {} added, {} removed, {} changed",
            summary.added,
            summary.removed,
            summary.changed
        );
        if summary.failures > 0 {
            tracing::warn!("{} entries could not be compared", summary.failures);
        }
    }

    Ok(result)
}
