//! npm packages found under `node_modules` directories.

use super::PackageExtractor;
use crate::error::{ExtractionErrorKind, ImageDiffError, Result};
use crate::image::Image;
use crate::model::{LayeredPackageMap, PackageInfo, PackageMaps, relative_entry};
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

const MODULES_DIR: &str = "node_modules";
const MANIFEST: &str = "package.json";

#[derive(Debug, Deserialize)]
struct NodeManifest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

/// Packages installed by npm, per layer and location.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeExtractor;

impl PackageExtractor for NodeExtractor {
    fn name(&self) -> &'static str {
        "node"
    }

    fn extract(&self, image: &Image) -> Result<PackageMaps> {
        let mut packages = LayeredPackageMap::new();
        for layer in &image.layers {
            let layer_name = Image::layer_name(layer);
            for entry in WalkDir::new(layer).follow_links(false).sort_by_file_name() {
                let entry = walk_entry(entry, layer)?;
                if !entry.file_type().is_file() || entry.file_name() != MANIFEST {
                    continue;
                }
                let Some(package_dir) = entry.path().parent() else {
                    continue;
                };
                if !is_installed_package(package_dir) {
                    continue;
                }
                let Ok(relative) = package_dir.strip_prefix(layer) else {
                    continue;
                };

                let manifest = read_manifest(entry.path())?;
                let name = manifest.name.unwrap_or_else(|| {
                    package_dir
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default()
                });
                let info = PackageInfo::new(
                    manifest.version.unwrap_or_default(),
                    directory_size(package_dir)?.to_string(),
                )
                .with_layer(layer_name.clone());

                packages
                    .entry(name)
                    .or_default()
                    .insert(format!("{layer_name}/{}", relative_entry(relative)), info);
            }
        }

        debug!("Found {} node packages in {}", packages.len(), image.source);
        Ok(PackageMaps::Layered(packages))
    }
}

/// Whether a directory is `node_modules/<pkg>` or `node_modules/@scope/<pkg>`.
fn is_installed_package(dir: &Path) -> bool {
    let Some(parent) = dir.parent() else {
        return false;
    };
    if parent.file_name() == Some(OsStr::new(MODULES_DIR)) {
        return true;
    }
    let scoped = parent
        .file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('@'));
    scoped
        && parent
            .parent()
            .and_then(Path::file_name)
            .is_some_and(|n| n == MODULES_DIR)
}

fn read_manifest(path: &Path) -> Result<NodeManifest> {
    let content = std::fs::read_to_string(path).map_err(|e| ImageDiffError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| {
        ImageDiffError::extraction(
            format!("reading {}", path.display()),
            ExtractionErrorKind::MalformedManifest {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        )
    })
}

/// Total bytes of the regular files below `dir`.
fn directory_size(dir: &Path) -> Result<u64> {
    let mut total = 0;
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = walk_entry(entry, dir)?;
        if entry.file_type().is_file() {
            let meta = entry
                .metadata()
                .map_err(|e| walk_error(e, entry.path()))?;
            total += meta.len();
        }
    }
    Ok(total)
}

fn walk_entry(
    entry: std::result::Result<walkdir::DirEntry, walkdir::Error>,
    root: &Path,
) -> Result<walkdir::DirEntry> {
    entry.map_err(|e| walk_error(e, root))
}

fn walk_error(e: walkdir::Error, fallback: &Path) -> ImageDiffError {
    let path = e.path().unwrap_or(fallback).to_path_buf();
    match e.into_io_error() {
        Some(io) => ImageDiffError::io(path, io),
        None => ImageDiffError::validation(format!("filesystem loop in {}", path.display())),
    }
}
