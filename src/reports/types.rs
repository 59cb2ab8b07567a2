//! Report type definitions.

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable text rendered through the template for the diff kind
    #[default]
    Text,
    /// The result structure serialized as JSON
    Json,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Template families, one per result kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Build history
    Hist,
    /// Filesystem
    Fs,
    /// Flat package map
    Single,
    /// Layered package map
    Multi,
}

impl TemplateKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hist => "hist",
            Self::Fs => "fs",
            Self::Single => "single",
            Self::Multi => "multi",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How much a text template prints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TemplateStyle {
    /// Every entry of every section
    #[default]
    Detailed,
    /// Section counts only
    Summary,
}

/// Template selected for each result kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TemplateConfig {
    pub hist: TemplateStyle,
    pub fs: TemplateStyle,
    pub single: TemplateStyle,
    pub multi: TemplateStyle,
}

impl TemplateConfig {
    /// Use the same style for every kind.
    #[must_use]
    pub const fn uniform(style: TemplateStyle) -> Self {
        Self {
            hist: style,
            fs: style,
            single: style,
            multi: style,
        }
    }

    #[must_use]
    pub const fn style_for(&self, kind: TemplateKind) -> TemplateStyle {
        match kind {
            TemplateKind::Hist => self.hist,
            TemplateKind::Fs => self.fs,
            TemplateKind::Single => self.single,
            TemplateKind::Multi => self.multi,
        }
    }
}

/// Configuration for report generation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Template selection for text output
    pub templates: TemplateConfig,
    /// Wrap JSON output with tool metadata
    pub include_metadata: bool,
    /// Use ANSI colors in text output
    pub colored: bool,
    /// Additional metadata to include
    pub metadata: ReportMetadata,
}

impl ReportConfig {
    #[must_use]
    pub fn with_templates(mut self, templates: TemplateConfig) -> Self {
        self.templates = templates;
        self
    }

    #[must_use]
    pub fn colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: ReportMetadata) -> Self {
        self.include_metadata = true;
        self.metadata = metadata;
        self
    }
}

/// Metadata included in reports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Source descriptor of the first image
    pub image1_source: Option<String>,
    /// Source descriptor of the second image
    pub image2_source: Option<String>,
    /// Tool version
    pub tool_version: String,
    /// Generation timestamp
    pub generated_at: Option<String>,
}

impl ReportMetadata {
    pub fn new() -> Self {
        Self {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_sources(mut self, image1: impl Into<String>, image2: impl Into<String>) -> Self {
        self.image1_source = Some(image1.into());
        self.image2_source = Some(image2.into());
        self
    }
}
