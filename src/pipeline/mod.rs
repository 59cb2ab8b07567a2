//! Pipeline orchestration for image diffs.
//!
//! Shared orchestration for the acquire → extract → diff → report workflow,
//! kept out of the CLI handlers so each stage can be tested on its own.

mod acquire;
mod diff_stage;
mod output;
mod report_stage;

pub use acquire::{acquire_image, snapshot};
pub use diff_stage::compute_diff;
pub use output::{OutputTarget, should_use_color, write_output};
pub use report_stage::{build_report_config, output_report};

/// Structured pipeline error types for better diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to resolve or extract an image
    #[error("Acquisition failed for {image}: {source}")]
    AcquisitionFailed {
        image: String,
        source: anyhow::Error,
    },

    /// Diff computation failed
    #[error("Diff failed: {source}")]
    DiffFailed {
        #[source]
        source: anyhow::Error,
    },

    /// Report generation or output failed
    #[error("Report failed: {source}")]
    ReportFailed {
        #[source]
        source: anyhow::Error,
    },
}

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success - no changes detected (or --fail-on-change not set)
    pub const SUCCESS: i32 = 0;
    /// Changes were detected, or some entries could not be compared
    /// (with --fail-on-change)
    pub const CHANGES_DETECTED: i32 = 1;
    /// Wrong argument count or unknown differ
    pub const USAGE: i32 = 2;
    /// An error occurred, or some entries could not be compared
    pub const ERROR: i32 = 3;
}
