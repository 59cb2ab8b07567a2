//! Configuration types for idiff operations.

use super::defaults::{DEFAULT_DOCKER_BINARY, default_shared_install_roots};
use crate::diff::{CorrelationRules, DiffKind, FailurePolicy};
use crate::reports::{ReportFormat, TemplateConfig};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// CLI arguments are layered over file settings with [`AppConfig::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Output configuration (format, file, colors, templates)
    pub output: OutputConfig,
    /// Package location correlation
    pub correlation: CorrelationConfig,
    /// Behavior flags
    pub behavior: BehaviorConfig,
    /// Image acquisition
    pub acquisition: AcquisitionConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Command-specific Configuration Types
// ============================================================================

/// Configuration for one diff run
#[derive(Debug, Clone)]
pub struct DiffConfig {
    /// The two images to compare
    pub sources: DiffSources,
    /// Which comparison to run
    pub kind: DiffKind,
    /// Output configuration
    pub output: OutputConfig,
    /// Package location correlation
    pub correlation: CorrelationConfig,
    /// Behavior flags
    pub behavior: BehaviorConfig,
    /// Image acquisition
    pub acquisition: AcquisitionConfig,
}

impl DiffConfig {
    /// Create a diff configuration with default settings.
    pub fn new(image1: impl Into<String>, image2: impl Into<String>, kind: DiffKind) -> Self {
        Self::from_app(
            DiffSources {
                image1: image1.into(),
                image2: image2.into(),
            },
            kind,
            AppConfig::default(),
        )
    }

    /// Assemble a run configuration from resolved application settings.
    #[must_use]
    pub fn from_app(sources: DiffSources, kind: DiffKind, app: AppConfig) -> Self {
        Self {
            sources,
            kind,
            output: app.output,
            correlation: app.correlation,
            behavior: app.behavior,
            acquisition: app.acquisition,
        }
    }
}

/// Source descriptors for a diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSources {
    /// Image ID, registry reference, archive or extracted directory
    pub image1: String,
    pub image2: String,
}

// ============================================================================
// Sub-configuration Types
// ============================================================================

/// Output-related configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: ReportFormat,
    /// Output file path (None for stdout)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Disable colored output
    pub no_color: bool,
    /// Wrap JSON output with tool metadata
    pub include_metadata: bool,
    /// Text template per diff kind
    pub templates: TemplateConfig,
}

/// Package location correlation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Layer-relative directories whose direct children are shared installs
    pub shared_install_roots: Vec<String>,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            shared_install_roots: default_shared_install_roots(),
        }
    }
}

impl CorrelationConfig {
    /// Correlation rules for the package differ.
    #[must_use]
    pub fn rules(&self) -> CorrelationRules {
        CorrelationRules::new(&self.shared_install_roots)
    }
}

/// Behavior flags for diff operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Exit with code 1 if any changes detected
    pub fail_on_change: bool,
    /// Suppress non-essential output
    pub quiet: bool,
    /// Abort a filesystem diff on the first file that cannot be compared
    pub fail_fast: bool,
}

impl BehaviorConfig {
    #[must_use]
    pub const fn failure_policy(&self) -> FailurePolicy {
        if self.fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::Collect
        }
    }
}

/// Image acquisition settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Container engine CLI used to save and pull images
    pub docker_binary: String,
    /// Keep extracted images on disk after the run
    pub keep_extracted: bool,
    /// Directory to extract images under (system temp dir if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            docker_binary: DEFAULT_DOCKER_BINARY.to_string(),
            keep_extracted: false,
            work_dir: None,
        }
    }
}
