//! Image source classification.

use crate::error::{AcquisitionErrorKind, ImageDiffError, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static IMAGE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(sha256:)?[0-9a-f]{12,64}$").expect("static regex"));

static IMAGE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+/.+$").expect("static regex"));

const ARCHIVE_SUFFIXES: &[&str] = &[".tar", ".tar.gz", ".tgz"];

/// Where an image comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// An already-extracted `docker save` layout on disk
    Directory,
    /// A `docker save` archive, optionally gzip-compressed
    Archive,
    /// A local image ID
    Id,
    /// A registry reference such as `gcr.io/project/image:tag`
    Url,
}

impl SourceKind {
    /// Classify a source string.
    ///
    /// Local paths win over pattern matches, so an archive whose name happens
    /// to look like a registry path is still read from disk.
    pub fn detect(source: &str) -> Result<Self> {
        let path = Path::new(source);
        if path.is_dir() {
            return Ok(Self::Directory);
        }
        if path.is_file() && ARCHIVE_SUFFIXES.iter().any(|s| source.ends_with(s)) {
            return Ok(Self::Archive);
        }
        if IMAGE_ID.is_match(source) {
            return Ok(Self::Id);
        }
        if IMAGE_URL.is_match(source) {
            return Ok(Self::Url);
        }
        Err(ImageDiffError::acquisition(
            format!("classifying {source}"),
            AcquisitionErrorKind::UnknownSource(source.to_string()),
        ))
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::Archive => "archive",
            Self::Id => "ID",
            Self::Url => "URL",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
