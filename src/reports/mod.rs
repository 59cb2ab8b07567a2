//! Report generation for diff results.
//!
//! Two output formats:
//! - JSON: the result structure itself, optionally wrapped with metadata
//! - Text: a template per result kind (`hist`, `fs`, `single`, `multi`)

mod json;
mod text;
mod types;

pub use json::JsonReporter;
pub use text::TextReporter;
pub use types::{
    ReportConfig, ReportFormat, ReportMetadata, TemplateConfig, TemplateKind, TemplateStyle,
};

use crate::diff::DiffResult;
use std::io::Write;
use thiserror::Error;

/// Errors that can occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Format error: {0}")]
    FormatError(#[from] std::fmt::Error),
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Render a diff result
    fn generate(&self, result: &DiffResult, config: &ReportConfig) -> Result<String, ReportError>;

    /// Write report to a writer
    fn write_report(
        &self,
        result: &DiffResult,
        config: &ReportConfig,
        writer: &mut dyn Write,
    ) -> Result<(), ReportError> {
        let report = self.generate(result, config)?;
        writer.write_all(report.as_bytes())?;
        Ok(())
    }

    /// Get the format this generator produces
    fn format(&self) -> ReportFormat;
}

/// Create a report generator for the given format
#[must_use]
pub fn create_reporter(format: ReportFormat) -> Box<dyn ReportGenerator> {
    create_reporter_with_options(format, true)
}

/// Create a report generator with color control
#[must_use]
pub fn create_reporter_with_options(
    format: ReportFormat,
    use_color: bool,
) -> Box<dyn ReportGenerator> {
    match format {
        ReportFormat::Text => {
            if use_color {
                Box::new(TextReporter::new())
            } else {
                Box::new(TextReporter::new().no_color())
            }
        }
        ReportFormat::Json => Box::new(JsonReporter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::HistDiff;

    #[test]
    fn test_create_reporter_formats() {
        assert_eq!(create_reporter(ReportFormat::Json).format(), ReportFormat::Json);
        assert_eq!(
            create_reporter_with_options(ReportFormat::Text, false).format(),
            ReportFormat::Text
        );
    }

    #[test]
    fn test_write_report() {
        let result = DiffResult::History(HistDiff::default());
        let mut buffer = Vec::new();
        JsonReporter::new()
            .write_report(&result, &ReportConfig::default(), &mut buffer)
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("\"adds\": []"));
    }
}
