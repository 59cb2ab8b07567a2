//! Image acquisition.
//!
//! Resolves an image source (local ID, registry reference, `docker save`
//! archive or an already-extracted archive) into a merged root filesystem,
//! its per-layer directories and its build history.

mod archive;
mod docker;
mod source;

pub use archive::{ImageLayout, apply_layer, unpack_archive};
pub use docker::DockerCli;
pub use source::SourceKind;

use crate::config::AcquisitionConfig;
use crate::error::{ErrorContext, ImageDiffError, Result};
use crate::model::Directory;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// Scratch space an image is extracted into.
#[derive(Debug)]
enum WorkDir {
    /// Removed when the image is dropped
    Temporary(TempDir),
    /// Left on disk after the run
    Kept(PathBuf),
}

impl WorkDir {
    fn create(parent: Option<&Path>, keep: bool) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("idiff-");
        let dir = match parent {
            Some(parent) => builder
                .tempdir_in(parent)
                .map_err(|e| ImageDiffError::io(parent, e))?,
            None => builder
                .tempdir()
                .map_err(|e| ImageDiffError::io(std::env::temp_dir(), e))?,
        };
        Ok(if keep {
            Self::Kept(dir.keep())
        } else {
            Self::Temporary(dir)
        })
    }

    fn path(&self) -> &Path {
        match self {
            Self::Temporary(dir) => dir.path(),
            Self::Kept(path) => path,
        }
    }
}

/// An image prepared for diffing.
#[derive(Debug)]
pub struct Image {
    /// The source string the image was prepared from
    pub source: String,
    /// Merged root filesystem
    pub fs_path: PathBuf,
    /// `created_by` of every build step, oldest first
    pub history: Vec<String>,
    /// Unpacked layer directories, base layer first
    pub layers: Vec<PathBuf>,
    workdir: Option<WorkDir>,
}

impl Image {
    /// Describe an image that already exists on disk.
    pub fn from_parts(
        source: impl Into<String>,
        fs_path: impl Into<PathBuf>,
        history: Vec<String>,
        layers: Vec<PathBuf>,
    ) -> Self {
        Self {
            source: source.into(),
            fs_path: fs_path.into(),
            history,
            layers,
            workdir: None,
        }
    }

    /// Scan the merged root filesystem.
    pub fn directory(&self) -> Result<Directory> {
        Directory::scan(&self.fs_path).with_context(|| format!("scanning {}", self.source))
    }

    /// Directory name of a layer, as used in location keys.
    #[must_use]
    pub fn layer_name(layer: &Path) -> String {
        layer
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Where the image was extracted, if it is kept after the run.
    #[must_use]
    pub fn kept_at(&self) -> Option<&Path> {
        match &self.workdir {
            Some(WorkDir::Kept(path)) => Some(path),
            _ => None,
        }
    }
}

/// Turns image sources into [`Image`]s.
#[derive(Debug, Clone)]
pub struct ImagePrepper {
    docker: DockerCli,
    keep_extracted: bool,
    work_dir: Option<PathBuf>,
}

impl Default for ImagePrepper {
    fn default() -> Self {
        Self::new(&AcquisitionConfig::default())
    }
}

impl ImagePrepper {
    pub fn new(config: &AcquisitionConfig) -> Self {
        Self {
            docker: DockerCli::new(config.docker_binary.clone()),
            keep_extracted: config.keep_extracted,
            work_dir: config.work_dir.clone(),
        }
    }

    /// Resolve `source`, extract it and merge its layers.
    pub fn prepare(&self, source: &str) -> Result<Image> {
        info!("Starting prep for image {source}");
        let kind = SourceKind::detect(source)?;
        debug!("Image source {source} detected as {kind}");

        let workdir = WorkDir::create(self.work_dir.as_deref(), self.keep_extracted)?;
        let scratch = workdir.path();
        let layout_root = self.resolve_to_filesystem(kind, source, scratch)?;

        let layout = ImageLayout::load(&layout_root)?;
        let history = layout.history()?;
        let layers = layout.unpack_layers(&scratch.join("layers"))?;

        let fs_path = scratch.join("rootfs");
        std::fs::create_dir_all(&fs_path).map_err(|e| ImageDiffError::io(&fs_path, e))?;
        for layer in &layers {
            apply_layer(layer, &fs_path)
                .with_context(|| format!("applying layer {}", layer.display()))?;
        }

        if let WorkDir::Kept(path) = &workdir {
            info!("Keeping extracted image {source} at {}", path.display());
        }
        info!("Finished prepping image {source}");
        Ok(Image {
            source: source.to_string(),
            fs_path,
            history,
            layers,
            workdir: Some(workdir),
        })
    }

    /// Get the extracted `docker save` layout of a source onto disk.
    ///
    /// Directories are used in place; everything else lands below `scratch`.
    pub fn resolve_to_filesystem(
        &self,
        kind: SourceKind,
        source: &str,
        scratch: &Path,
    ) -> Result<PathBuf> {
        match kind {
            SourceKind::Directory => Ok(PathBuf::from(source)),
            SourceKind::Archive => {
                let dest = scratch.join("image");
                unpack_archive(Path::new(source), &dest)?;
                Ok(dest)
            }
            SourceKind::Id => self.save_and_unpack(source, scratch),
            SourceKind::Url => {
                self.docker.pull(source)?;
                self.save_and_unpack(source, scratch)
            }
        }
    }

    fn save_and_unpack(&self, image: &str, scratch: &Path) -> Result<PathBuf> {
        let tar_path = scratch.join("image.tar");
        self.docker.save(image, &tar_path)?;
        let dest = scratch.join("image");
        unpack_archive(&tar_path, &dest)?;
        std::fs::remove_file(&tar_path).map_err(|e| ImageDiffError::io(&tar_path, e))?;
        Ok(dest)
    }
}
