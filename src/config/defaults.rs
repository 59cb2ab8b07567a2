//! Default configurations and presets for idiff.
//!
//! Provides named presets for common use cases and default values.

use super::types::{AppConfig, BehaviorConfig, OutputConfig};
use crate::diff::DEFAULT_SHARED_INSTALL_ROOTS;
use crate::reports::{ReportFormat, TemplateConfig, TemplateStyle};

// ============================================================================
// Default Values
// ============================================================================

/// Container engine CLI used when none is configured
pub const DEFAULT_DOCKER_BINARY: &str = "docker";

/// Shared install roots as owned strings.
#[must_use]
pub fn default_shared_install_roots() -> Vec<String> {
    DEFAULT_SHARED_INSTALL_ROOTS
        .iter()
        .map(|root| (*root).to_string())
        .collect()
}

// ============================================================================
// Configuration Presets
// ============================================================================

/// Named configuration presets for common use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Detailed text output
    Default,
    /// CI/CD: JSON with metadata, no color, fail on changes
    CiCd,
    /// Section counts only
    Summary,
}

impl ConfigPreset {
    /// Get the preset name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::CiCd => "ci-cd",
            Self::Summary => "summary",
        }
    }

    /// Parse a preset from a string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" | "detailed" => Some(Self::Default),
            "ci-cd" | "ci" | "pipeline" => Some(Self::CiCd),
            "summary" | "brief" => Some(Self::Summary),
            _ => None,
        }
    }

    /// Get a description of this preset.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Default => "Detailed text reports for every diff kind",
            Self::CiCd => "JSON with metadata, no colors, exit code 1 on any change",
            Self::Summary => "Text reports that only print section counts",
        }
    }

    /// Get all available presets.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Default, Self::CiCd, Self::Summary]
    }
}

impl std::fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl AppConfig {
    /// Create an `AppConfig` from a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Default => Self::default(),
            ConfigPreset::CiCd => Self {
                output: OutputConfig {
                    format: ReportFormat::Json,
                    no_color: true,
                    include_metadata: true,
                    ..OutputConfig::default()
                },
                behavior: BehaviorConfig {
                    fail_on_change: true,
                    quiet: true,
                    ..BehaviorConfig::default()
                },
                ..Self::default()
            },
            ConfigPreset::Summary => Self {
                output: OutputConfig {
                    templates: TemplateConfig::uniform(TemplateStyle::Summary),
                    ..OutputConfig::default()
                },
                ..Self::default()
            },
        }
    }
}
