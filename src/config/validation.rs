//! Configuration validation for idiff.
//!
//! Provides validation traits and implementations for all configuration types.

use super::types::{AcquisitionConfig, AppConfig, BehaviorConfig, CorrelationConfig, OutputConfig};
use crate::reports::ReportFormat;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.output.validate());
        errors.extend(self.correlation.validate());
        errors.extend(self.behavior.validate());
        errors.extend(self.acquisition.validate());
        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Some(ref file_path) = self.file
            && let Some(parent) = file_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            errors.push(ConfigError::new(
                "output.file",
                format!("Parent directory does not exist: {}", parent.display()),
            ));
        }

        if self.include_metadata && self.format != ReportFormat::Json {
            errors.push(ConfigError::new(
                "output.include_metadata",
                "Metadata can only be included in JSON output",
            ));
        }

        errors
    }
}

impl Validatable for CorrelationConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for root in &self.shared_install_roots {
            if root.trim_matches('/').is_empty() {
                errors.push(ConfigError::new(
                    "correlation.shared_install_roots",
                    format!("Install root '{root}' names no directory"),
                ));
            } else if root.starts_with('/') {
                errors.push(ConfigError::new(
                    "correlation.shared_install_roots",
                    format!("Install root '{root}' must be relative to the layer root"),
                ));
            }
        }
        errors
    }
}

impl Validatable for BehaviorConfig {
    fn validate(&self) -> Vec<ConfigError> {
        Vec::new()
    }
}

impl Validatable for AcquisitionConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.docker_binary.trim().is_empty() {
            errors.push(ConfigError::new(
                "acquisition.docker_binary",
                "Container engine binary must not be empty",
            ));
        }

        if let Some(ref dir) = self.work_dir
            && !dir.is_dir()
        {
            errors.push(ConfigError::new(
                "acquisition.work_dir",
                format!("Work directory does not exist: {}", dir.display()),
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().is_valid());
    }

    #[test]
    fn test_output_file_parent_must_exist() {
        let config = OutputConfig {
            file: Some(PathBuf::from("/nonexistent/dir/report.json")),
            ..OutputConfig::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "output.file");
    }

    #[test]
    fn test_metadata_requires_json() {
        let config = OutputConfig {
            include_metadata: true,
            ..OutputConfig::default()
        };
        assert!(!config.is_valid());

        let config = OutputConfig {
            format: ReportFormat::Json,
            include_metadata: true,
            ..OutputConfig::default()
        };
        assert!(config.is_valid());
    }

    #[test]
    fn test_install_roots_must_be_relative() {
        let config = CorrelationConfig {
            shared_install_roots: vec!["/usr/lib/node_modules".to_string(), "/".to_string()],
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].to_string().contains("relative"));
    }

    #[test]
    fn test_empty_docker_binary() {
        let config = AcquisitionConfig {
            docker_binary: "  ".to_string(),
            ..AcquisitionConfig::default()
        };
        assert!(!config.is_valid());
    }
}
