//! Debian packages from the dpkg status database.

use super::PackageExtractor;
use crate::error::{ExtractionErrorKind, ImageDiffError, Result};
use crate::image::Image;
use crate::model::{FlatPackageMap, PackageInfo, PackageMaps};
use std::collections::HashMap;
use std::io;
use std::path::Path;
use tracing::debug;

/// Location of the dpkg status database relative to a filesystem root.
pub const STATUS_FILE: &str = "var/lib/dpkg/status";

/// One stanza of a dpkg status file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub package: String,
    pub version: String,
    /// `Installed-Size` as recorded, in KiB
    pub installed_size: Option<String>,
    /// Whether the `Status` field ends in `installed`
    pub installed: bool,
}

/// Parse the RFC-822 style stanzas of a dpkg status file.
///
/// Continuation lines are skipped. A stanza without a `Package` field or a
/// line that is neither a field nor a continuation is malformed.
pub fn parse_status(content: &str, path: &Path) -> Result<Vec<StatusEntry>> {
    let malformed = |line: usize, message: &str| {
        ImageDiffError::extraction(
            format!("parsing {}", path.display()),
            ExtractionErrorKind::MalformedDatabase {
                path: path.to_path_buf(),
                message: format!("line {line}: {message}"),
            },
        )
    };

    let mut entries = Vec::new();
    let mut fields: Vec<(&str, &str)> = Vec::new();
    let mut stanza_start = 1;

    // A trailing blank line closes the last stanza
    for (index, line) in content.lines().chain(std::iter::once("")).enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            if !fields.is_empty() {
                let entry = stanza_entry(&fields)
                    .ok_or_else(|| malformed(stanza_start, "stanza has no Package field"))?;
                entries.push(entry);
                fields.clear();
            }
            stanza_start = line_no + 1;
            continue;
        }
        if line.starts_with([' ', '\t']) {
            if fields.is_empty() {
                return Err(malformed(line_no, "continuation line outside a field"));
            }
            continue;
        }
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| malformed(line_no, "expected `Field: value`"))?;
        fields.push((key.trim(), value.trim()));
    }

    Ok(entries)
}

fn stanza_entry(fields: &[(&str, &str)]) -> Option<StatusEntry> {
    let field = |name: &str| {
        fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    };
    Some(StatusEntry {
        package: field("Package")?.to_string(),
        version: field("Version").unwrap_or_default().to_string(),
        installed_size: field("Installed-Size").map(str::to_string),
        installed: field("Status")
            .is_none_or(|status| status.split_whitespace().last() == Some("installed")),
    })
}

/// Read and parse a status file. A missing file yields `None`.
fn read_status(path: &Path) -> Result<Option<Vec<StatusEntry>>> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_status(&content, path).map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ImageDiffError::io(path, e)),
    }
}

/// Packages installed by apt/dpkg.
///
/// The merged root filesystem's status file is authoritative; each package
/// is attributed to the first layer whose own status file lists the same
/// version.
#[derive(Debug, Clone, Copy, Default)]
pub struct AptExtractor;

impl PackageExtractor for AptExtractor {
    fn name(&self) -> &'static str {
        "apt"
    }

    fn extract(&self, image: &Image) -> Result<PackageMaps> {
        let Some(entries) = read_status(&image.fs_path.join(STATUS_FILE))? else {
            debug!("No dpkg status file in {}", image.source);
            return Ok(PackageMaps::Flat(FlatPackageMap::new()));
        };

        let mut layer_versions = Vec::with_capacity(image.layers.len());
        for layer in &image.layers {
            let versions: HashMap<String, String> = read_status(&layer.join(STATUS_FILE))?
                .unwrap_or_default()
                .into_iter()
                .filter(|entry| entry.installed)
                .map(|entry| (entry.package, entry.version))
                .collect();
            layer_versions.push((Image::layer_name(layer), versions));
        }

        let packages: FlatPackageMap = entries
            .into_iter()
            .filter(|entry| entry.installed)
            .map(|entry| {
                let introduced_in = layer_versions
                    .iter()
                    .find(|(_, versions)| versions.get(&entry.package) == Some(&entry.version))
                    .map(|(name, _)| name.clone());
                let mut info =
                    PackageInfo::new(entry.version, entry.installed_size.unwrap_or_default());
                if let Some(layer) = introduced_in {
                    info = info.with_layer(layer);
                }
                (entry.package, info)
            })
            .collect();

        debug!("Found {} apt packages in {}", packages.len(), image.source);
        Ok(PackageMaps::Flat(packages))
    }
}
