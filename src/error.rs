//! Unified error types for idiff.
//!
//! Every failure in the library is returned to the immediate caller as an
//! [`ImageDiffError`]. Nothing below `main` logs-and-swallows an error or
//! terminates the process.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for idiff operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ImageDiffError {
    /// The two package maps handed to the package differ are not the same shape
    #[error("Package maps are not comparable: left is {left}, right is {right}")]
    ShapeMismatch { left: String, right: String },

    /// The two inputs handed to the engine belong to different diff kinds
    #[error("Cannot diff a {left} input against a {right} input")]
    InputKindMismatch { left: String, right: String },

    /// A directory description or package map could not be read or parsed
    #[error("Missing or malformed input: {context}")]
    Input {
        context: String,
        #[source]
        source: InputErrorKind,
    },

    /// A stat or read failed while comparing file contents
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Resolving an image source into a filesystem failed
    #[error("Image acquisition failed: {context}")]
    Acquisition {
        context: String,
        #[source]
        source: AcquisitionErrorKind,
    },

    /// Scanning an image for installed packages failed
    #[error("Package extraction failed: {context}")]
    Extraction {
        context: String,
        #[source]
        source: ExtractionErrorKind,
    },

    /// Rendering a diff result failed
    #[error("Report generation failed: {0}")]
    Report(String),

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Reasons an input description could not be used.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum InputErrorKind {
    #[error("Input file not found: {0}")]
    NotFound(PathBuf),

    #[error("Input file could not be read: {0}")]
    Unreadable(String),

    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Unrecognized package map shape: {0}")]
    UnknownShape(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),
}

/// Reasons an image source could not be resolved.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AcquisitionErrorKind {
    #[error("Could not retrieve image from source '{0}'")]
    UnknownSource(String),

    #[error("`{command}` failed with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Image manifest is invalid: {0}")]
    InvalidManifest(String),

    #[error("Archive extraction failed: {0}")]
    Archive(String),
}

/// Reasons a package scan failed.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ExtractionErrorKind {
    #[error("Malformed package database {path:?}: {message}")]
    MalformedDatabase { path: PathBuf, message: String },

    #[error("Malformed package manifest {path:?}: {message}")]
    MalformedManifest { path: PathBuf, message: String },
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for idiff operations
pub type Result<T> = std::result::Result<T, ImageDiffError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl ImageDiffError {
    /// Create a shape mismatch error
    pub fn shape_mismatch(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Create an input error with context
    pub fn input(context: impl Into<String>, source: InputErrorKind) -> Self {
        Self::Input {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create an acquisition error
    pub fn acquisition(context: impl Into<String>, source: AcquisitionErrorKind) -> Self {
        Self::Acquisition {
            context: context.into(),
            source,
        }
    }

    /// Create an extraction error
    pub fn extraction(context: impl Into<String>, source: ExtractionErrorKind) -> Self {
        Self::Extraction {
            context: context.into(),
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error came from a failed stat or read.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for ImageDiffError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ImageDiffError {
    fn from(err: serde_json::Error) -> Self {
        Self::input(
            "JSON deserialization",
            InputErrorKind::InvalidJson(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings chain rather than replace, so the final message shows the
/// path through the code:
///
/// ```ignore
/// use idiff::error::ErrorContext;
///
/// let dir = Directory::from_json_file(path)
///     .with_context(|| format!("loading directory for {}", image.source))?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<ImageDiffError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: ImageDiffError, new_ctx: &str) -> ImageDiffError {
    match err {
        ImageDiffError::Input {
            context: existing,
            source,
        } => ImageDiffError::Input {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ImageDiffError::Acquisition {
            context: existing,
            source,
        } => ImageDiffError::Acquisition {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ImageDiffError::Extraction {
            context: existing,
            source,
        } => ImageDiffError::Extraction {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ImageDiffError::Io {
            path,
            message,
            source,
        } => ImageDiffError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        ImageDiffError::Report(msg) => ImageDiffError::Report(chain_context(new_ctx, &msg)),
        ImageDiffError::Config(msg) => ImageDiffError::Config(chain_context(new_ctx, &msg)),
        ImageDiffError::Validation(msg) => {
            ImageDiffError::Validation(chain_context(new_ctx, &msg))
        }
        // Shape and kind mismatches already name both sides
        other @ (ImageDiffError::ShapeMismatch { .. }
        | ImageDiffError::InputKindMismatch { .. }) => other,
    }
}

/// Chain two context strings together.
///
/// Returns "`new_context`: `existing_context`", or just the new context when
/// nothing exists yet.
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to an error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| ImageDiffError::Validation(context.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ImageDiffError::shape_mismatch("flat", "layered");
        let display = err.to_string();
        assert!(display.contains("flat"), "{display}");
        assert!(display.contains("layered"), "{display}");

        let err = ImageDiffError::input(
            "reading dir.json",
            InputErrorKind::NotFound(PathBuf::from("dir.json")),
        );
        assert!(err.to_string().contains("Missing or malformed input"));
    }

    #[test]
    fn test_io_error_carries_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ImageDiffError::io("/layers/a/etc/passwd", io_err);

        assert!(err.is_io());
        assert!(err.to_string().contains("/layers/a/etc/passwd"));
    }

    #[test]
    fn test_context_chaining_multiple_levels() {
        fn inner() -> Result<()> {
            Err(ImageDiffError::input(
                "base",
                InputErrorKind::InvalidJson("eof".to_string()),
            ))
        }

        fn middle() -> Result<()> {
            inner().context("middle layer")
        }

        fn outer() -> Result<()> {
            middle().context("outer layer")
        }

        match outer() {
            Err(ImageDiffError::Input { context, .. }) => {
                assert_eq!(context, "outer layer: middle layer: base");
            }
            other => panic!("Expected Input error, got {other:?}"),
        }
    }

    #[test]
    fn test_shape_mismatch_ignores_context() {
        let err: Result<()> = Err(ImageDiffError::shape_mismatch("flat", "layered"));
        match err.context("diffing packages") {
            Err(ImageDiffError::ShapeMismatch { left, right }) => {
                assert_eq!(left, "flat");
                assert_eq!(right, "layered");
            }
            other => panic!("Expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let mut called = false;

        let ok_result: Result<i32> = Ok(42);
        let _ = ok_result.with_context(|| {
            called = true;
            "should not be called"
        });
        assert!(!called, "Closure should not be called for Ok result");

        let err_result: Result<i32> = Err(ImageDiffError::validation("error"));
        let _ = err_result.with_context(|| {
            called = true;
            "should be called"
        });
        assert!(called, "Closure should be called for Err result");
    }

    #[test]
    fn test_option_context() {
        let none_value: Option<i32> = None;
        match none_value.context_none("missing value") {
            Err(ImageDiffError::Validation(msg)) => assert_eq!(msg, "missing value"),
            other => panic!("Expected Validation error, got {other:?}"),
        }
        assert_eq!(Some(7).context_none("unused").ok(), Some(7));
    }

    #[test]
    fn test_chain_context_helper() {
        assert_eq!(chain_context("new", ""), "new");
        assert_eq!(chain_context("new", "existing"), "new: existing");
    }
}
