//! **Compare two container images.**
//!
//! `idiff` prepares two images (local IDs, registry references, `docker save`
//! archives or already-extracted archives), then diffs one aspect of them:
//!
//! - **History**: the `created_by` of every build step
//! - **Filesystem**: entries present in only one image, and common files whose
//!   contents differ
//! - **apt**: Debian packages recorded in the dpkg status database
//! - **node**: npm packages found under `node_modules` in every layer, with
//!   per-location correlation so that a package moved between layers is not
//!   reported as a change
//!
//! ## Core Concepts & Modules
//!
//! - **[`image`]**: turns a source string into an [`Image`]: merged root
//!   filesystem, per-layer directories and build history.
//! - **[`packages`]**: extracts [`PackageMaps`] from a prepared image.
//! - **[`diff`]**: home of the [`DiffEngine`], which picks the right differ for
//!   a pair of inputs and returns a [`DiffResult`].
//! - **[`reports`]**: JSON and text rendering of a result.
//! - **[`pipeline`]**: the stages the CLI runs, usable on their own.
//!
//! ## Diffing Two Directories
//!
//! ```no_run
//! use std::path::Path;
//! use idiff::{DiffEngine, Directory};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let old = Directory::scan(Path::new("old-rootfs"))?;
//!     let new = Directory::scan(Path::new("new-rootfs"))?;
//!
//!     let result = DiffEngine::new().diff_directories(&old, &new)?;
//!     println!("{}", result.output(false, &Default::default())?);
//!     Ok(())
//! }
//! ```
//!
//! ## Diffing Installed Packages of Two Images
//!
//! ```no_run
//! use idiff::{DiffEngine, ImagePrepper};
//! use idiff::packages::{NodeExtractor, PackageExtractor};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let prepper = ImagePrepper::default();
//!     let old = prepper.prepare("app-1.0.tar")?;
//!     let new = prepper.prepare("app-1.1.tar")?;
//!
//!     let result = DiffEngine::new().diff_packages(
//!         &NodeExtractor.extract(&old)?,
//!         &NodeExtractor.extract(&new)?,
//!     )?;
//!     println!("{} packages changed", result.summary().total());
//!     Ok(())
//! }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::struct_excessive_bools,
    // Variable names like `old`/`new` or `d1`/`d2` are clear in context
    clippy::similar_names
)]

pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod image;
pub mod model;
pub mod packages;
pub mod pipeline;
pub mod reports;
pub mod utils;

// Re-export main types for convenience
pub use config::{AppConfig, ConfigPreset, DiffConfig};
pub use config::{AcquisitionConfig, BehaviorConfig, CorrelationConfig, OutputConfig};
pub use config::{ConfigError, Validatable};
pub use diff::{DiffEngine, DiffInput, DiffKind, DiffResult};
pub use error::{ErrorContext, ImageDiffError, OptionContext, Result};
pub use image::{Image, ImagePrepper};
pub use model::{Directory, PackageInfo, PackageMaps};
pub use reports::{ReportConfig, ReportFormat, ReportGenerator};
