//! JSON report generator.

use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator};
use crate::diff::{DiffResult, DiffSummary};
use chrono::Utc;
use serde::Serialize;

/// JSON report generator
pub struct JsonReporter {
    /// Pretty print output
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: true }
    }

    /// Set pretty printing
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn serialize<T: Serialize>(&self, value: &T) -> Result<String, ReportError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        json.map_err(|e| ReportError::SerializationError(e.to_string()))
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for JsonReporter {
    fn generate(&self, result: &DiffResult, config: &ReportConfig) -> Result<String, ReportError> {
        if !config.include_metadata {
            return self.serialize(result);
        }

        let report = JsonDiffReport {
            metadata: JsonReportMetadata {
                tool: ToolInfo {
                    name: "idiff".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
                generated_at: config
                    .metadata
                    .generated_at
                    .clone()
                    .unwrap_or_else(|| Utc::now().to_rfc3339()),
                kind: result.template_kind().name(),
                image1_source: config.metadata.image1_source.as_deref(),
                image2_source: config.metadata.image2_source.as_deref(),
            },
            summary: result.summary(),
            diff: result,
        };
        self.serialize(&report)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }
}

// ============================================================================
// JSON structures
// ============================================================================

#[derive(Serialize)]
struct JsonDiffReport<'a> {
    metadata: JsonReportMetadata<'a>,
    summary: DiffSummary,
    diff: &'a DiffResult,
}

#[derive(Serialize)]
struct JsonReportMetadata<'a> {
    tool: ToolInfo,
    generated_at: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image1_source: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image2_source: Option<&'a str>,
}

#[derive(Serialize)]
struct ToolInfo {
    name: String,
    version: String,
}
