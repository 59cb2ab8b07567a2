//! Configuration module for idiff.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - Named presets for common use cases
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use idiff::config::{AppConfig, ConfigPreset};
//!
//! // Use defaults
//! let config = AppConfig::default();
//!
//! // Use a preset
//! let config = AppConfig::from_preset(ConfigPreset::CiCd);
//!
//! // Load from file
//! use idiff::config::file::load_or_default;
//! let (config, loaded_from) = load_or_default(None);
//! ```
//!
//! # Configuration File
//!
//! Place a `.idiff.yaml` file in your project root or `~/.config/idiff/`:
//!
//! ```yaml
//! output:
//!   templates:
//!     multi: summary
//! acquisition:
//!   docker_binary: podman
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{ConfigPreset, DEFAULT_DOCKER_BINARY, default_shared_install_roots};
pub use types::{
    AcquisitionConfig, AppConfig, BehaviorConfig, CorrelationConfig, DiffConfig, DiffSources,
    OutputConfig,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    ConfigFileError, discover_config_file, generate_example_config, generate_full_example_config,
    load_config_file, load_or_default,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// This schema documents all configuration options that can be set in
/// `.idiff.yaml` config files. It can be used by editors for
/// validation and autocompletion.
pub fn generate_json_schema() -> crate::error::Result<String> {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema)
        .map_err(|e| crate::error::ImageDiffError::config(format!("schema serialization: {e}")))
}
