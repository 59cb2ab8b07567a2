//! Diff command handler.
//!
//! Prepares both images, runs the selected differ and writes the report.

use crate::config::DiffConfig;
use crate::diff::DiffResult;
use crate::image::ImagePrepper;
use crate::pipeline::{acquire_image, compute_diff, exit_codes, output_report, snapshot};
use anyhow::Result;
use tracing::warn;

/// Run the diff command, returning the desired exit code.
///
/// The caller is responsible for calling `std::process::exit()` with the
/// returned code when it is non-zero.
#[allow(clippy::needless_pass_by_value)]
pub fn run_diff(config: DiffConfig) -> Result<i32> {
    let quiet = config.behavior.quiet;
    let prepper = ImagePrepper::new(&config.acquisition);

    let image1 = acquire_image(&prepper, &config.sources.image1, quiet)?;
    let image2 = acquire_image(&prepper, &config.sources.image2, quiet)?;

    let old = snapshot(config.kind, &image1)?;
    let new = snapshot(config.kind, &image2)?;

    let result = compute_diff(&config, &old, &new)?;
    let exit_code = determine_exit_code(&config, &result);

    output_report(&config, &result)?;
    Ok(exit_code)
}

/// Determine the appropriate exit code based on diff results and config flags.
///
/// Entries that could not be compared leave the result incomplete: they
/// count as a change under `--fail-on-change` and as an error otherwise.
#[must_use]
pub fn determine_exit_code(config: &DiffConfig, result: &DiffResult) -> i32 {
    let failures = result.summary().failures;
    if failures > 0 {
        warn!("{failures} entries could not be compared");
        return if config.behavior.fail_on_change {
            exit_codes::CHANGES_DETECTED
        } else {
            exit_codes::ERROR
        };
    }
    if config.behavior.fail_on_change && result.has_changes() {
        return exit_codes::CHANGES_DETECTED;
    }
    exit_codes::SUCCESS
}
