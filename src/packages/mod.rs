//! Installed-package extraction.
//!
//! Each extractor scans a prepared [`Image`] and produces the package map
//! the package differ compares: flat for apt, layered for node.

mod apt;
mod node;

pub use apt::{AptExtractor, STATUS_FILE, StatusEntry, parse_status};
pub use node::NodeExtractor;

use crate::diff::DiffKind;
use crate::error::Result;
use crate::image::Image;
use crate::model::PackageMaps;

/// Scans an image for installed packages.
pub trait PackageExtractor: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Collect the image's packages.
    fn extract(&self, image: &Image) -> Result<PackageMaps>;
}

/// The extractor for a package diff kind, `None` for the other kinds.
#[must_use]
pub fn extractor_for(kind: DiffKind) -> Option<Box<dyn PackageExtractor>> {
    match kind {
        DiffKind::Apt => Some(Box::new(AptExtractor)),
        DiffKind::Node => Some(Box::new(NodeExtractor)),
        DiffKind::History | DiffKind::Filesystem => None,
    }
}
