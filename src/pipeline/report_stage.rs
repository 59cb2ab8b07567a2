//! Report output stage.

use super::{OutputTarget, PipelineError, should_use_color, write_output};
use crate::config::DiffConfig;
use crate::diff::DiffResult;
use crate::reports::{ReportConfig, ReportFormat, ReportMetadata};
use anyhow::Result;

/// Reporter settings for a run.
pub fn build_report_config(config: &DiffConfig, target: &OutputTarget) -> ReportConfig {
    let report_config = ReportConfig::default()
        .with_templates(config.output.templates)
        .colored(should_use_color(config.output.no_color, target));
    if config.output.include_metadata {
        report_config.with_metadata(
            ReportMetadata::new()
                .with_sources(config.sources.image1.clone(), config.sources.image2.clone()),
        )
    } else {
        report_config
    }
}

/// Render a diff result and write it to the configured destination.
pub fn output_report(config: &DiffConfig, result: &DiffResult) -> Result<()> {
    let target = OutputTarget::from_option(config.output.file.clone());
    let report_config = build_report_config(config, &target);
    let as_json = config.output.format == ReportFormat::Json;

    let report = result
        .output(as_json, &report_config)
        .map_err(|e| PipelineError::ReportFailed { source: e.into() })?;

    write_output(&report, &target, config.behavior.quiet)
}
