//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::defaults::DEFAULT_DOCKER_BINARY;
use super::types::{AppConfig, CorrelationConfig};
use crate::reports::{ReportFormat, TemplateConfig};
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[".idiff.yaml", ".idiff.yml", "idiff.yaml", "idiff.yml"];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/idiff/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path
        && path.exists()
    {
        return Some(path.to_path_buf());
    }

    if let Ok(cwd) = std::env::current_dir()
        && let Some(path) = find_config_in_dir(&cwd)
    {
        return Some(path);
    }

    if let Some(git_root) = find_git_root()
        && let Some(path) = find_config_in_dir(&git_root)
    {
        return Some(path);
    }

    if let Some(config_dir) = dirs::config_dir()
        && let Some(path) = find_config_in_dir(&config_dir.join("idiff"))
    {
        return Some(path);
    }

    if let Some(home) = dirs::home_dir()
        && let Some(path) = find_config_in_dir(&home)
    {
        return Some(path);
    }

    None
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml_ng::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml_ng::Error> for ConfigFileError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml_ng::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Merge another config into this one, with `other` taking precedence.
    ///
    /// Only settings that differ from their defaults in `other` are applied,
    /// so unset CLI flags leave file settings alone.
    pub fn merge(&mut self, other: &Self) {
        // Output config
        if other.output.format != ReportFormat::Text {
            self.output.format = other.output.format;
        }
        if other.output.file.is_some() {
            self.output.file.clone_from(&other.output.file);
        }
        if other.output.no_color {
            self.output.no_color = true;
        }
        if other.output.include_metadata {
            self.output.include_metadata = true;
        }
        if other.output.templates != TemplateConfig::default() {
            self.output.templates = other.output.templates;
        }

        // Correlation config
        if other.correlation != CorrelationConfig::default() {
            self.correlation.clone_from(&other.correlation);
        }

        // Behavior config (booleans - if set to true, override)
        if other.behavior.fail_on_change {
            self.behavior.fail_on_change = true;
        }
        if other.behavior.quiet {
            self.behavior.quiet = true;
        }
        if other.behavior.fail_fast {
            self.behavior.fail_fast = true;
        }

        // Acquisition config
        if other.acquisition.docker_binary != DEFAULT_DOCKER_BINARY {
            self.acquisition
                .docker_binary
                .clone_from(&other.acquisition.docker_binary);
        }
        if other.acquisition.keep_extracted {
            self.acquisition.keep_extracted = true;
        }
        if other.acquisition.work_dir.is_some() {
            self.acquisition
                .work_dir
                .clone_from(&other.acquisition.work_dir);
        }
    }

    /// Load from file and merge with CLI overrides.
    #[must_use]
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        cli_overrides: &Self,
    ) -> (Self, Option<PathBuf>) {
        let (mut config, loaded_from) = load_or_default(config_path);
        config.merge(cli_overrides);
        (config, loaded_from)
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate an example config file content.
#[must_use]
pub fn generate_example_config() -> String {
    let example = AppConfig::default();
    format!(
        r"# idiff configuration
# Place this file at .idiff.yaml in your project root or ~/.config/idiff/

{}
",
        serde_yaml_ng::to_string(&example).unwrap_or_default()
    )
}

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r"# idiff Configuration File
# =========================
#
# Place it at:
#   - .idiff.yaml in your project root
#   - ~/.config/idiff/idiff.yaml for global config
#
# CLI arguments always override file settings.

# Output configuration
output:
  # Format: text, json
  format: text
  # Output file path (omit for stdout)
  # file: diff.json
  # Disable colored output
  no_color: false
  # Wrap JSON output with tool metadata
  include_metadata: false
  # Template per diff kind: detailed, summary
  templates:
    hist: detailed
    fs: detailed
    single: detailed
    multi: detailed

# Package location correlation
correlation:
  # Layer-relative directories whose direct children are shared installs.
  # Any two shared installs of a package are treated as the same instance.
  shared_install_roots:
    - node_modules
    - usr/local/lib/node_modules
    - usr/lib/node_modules

# Behavior flags
behavior:
  # Exit with code 1 if any changes detected
  fail_on_change: false
  # Suppress non-essential output
  quiet: false
  # Abort a filesystem diff on the first file that cannot be compared
  fail_fast: false

# Image acquisition
acquisition:
  # Container engine CLI used to save and pull images
  docker_binary: docker
  # Keep extracted images on disk after the run
  keep_extracted: false
  # Directory to extract images under (system temp dir if unset)
  # work_dir: /var/tmp/idiff
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
