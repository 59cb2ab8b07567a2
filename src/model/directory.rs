//! Filesystem snapshot descriptions.

use crate::error::{ImageDiffError, InputErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A flattened view of one filesystem tree.
///
/// `entries` are paths relative to `root`, using `/` as the separator, and
/// are unique. The order is the traversal order the producer chose and is
/// preserved by every differ that reports per-entry results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    /// Root the entries are relative to
    #[serde(alias = "Name")]
    pub root: PathBuf,
    /// Relative entry paths
    #[serde(default, alias = "Files")]
    pub entries: Vec<String>,
}

impl Directory {
    /// Create a directory description from parts.
    pub fn new(root: impl Into<PathBuf>, entries: Vec<String>) -> Self {
        Self {
            root: root.into(),
            entries,
        }
    }

    /// Parse a JSON directory description.
    ///
    /// Accepts both `{"root", "entries"}` and the legacy `{"Name", "Files"}`
    /// field names. Duplicate entries are rejected.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let dir: Self = serde_json::from_str(json)?;
        dir.check_unique()?;
        Ok(dir)
    }

    /// Read and parse a JSON directory description from disk.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            let kind = if e.kind() == std::io::ErrorKind::NotFound {
                InputErrorKind::NotFound(path.to_path_buf())
            } else {
                InputErrorKind::Unreadable(e.to_string())
            };
            ImageDiffError::input(format!("reading {}", path.display()), kind)
        })?;
        Self::from_json_str(&content).map_err(|e| match e {
            ImageDiffError::Input { context, source } => ImageDiffError::input(
                format!("parsing {}: {context}", path.display()),
                source,
            ),
            other => other,
        })
    }

    /// Walk a real directory tree and describe it.
    ///
    /// Every file, symlink and directory below `root` becomes an entry, sorted
    /// by path. Symlinks are recorded but not followed.
    pub fn scan(root: &Path) -> Result<Self> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                match e.into_io_error() {
                    Some(io) => ImageDiffError::io(path, io),
                    None => ImageDiffError::validation(format!(
                        "filesystem loop while scanning {}",
                        path.display()
                    )),
                }
            })?;
            if entry.depth() == 0 {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(root) {
                entries.push(relative_entry(relative));
            }
        }
        tracing::debug!("Scanned {} entries under {}", entries.len(), root.display());
        Ok(Self::new(root, entries))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the description has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Absolute location of an entry on disk.
    #[must_use]
    pub fn path_of(&self, entry: &str) -> PathBuf {
        self.root.join(entry)
    }

    fn check_unique(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !seen.insert(entry.as_str()) {
                return Err(ImageDiffError::input(
                    format!("directory {}", self.root.display()),
                    InputErrorKind::DuplicateEntry(entry.clone()),
                ));
            }
        }
        Ok(())
    }
}

/// Render a relative path with `/` separators regardless of platform.
pub(crate) fn relative_entry(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_directory_json() {
        let dir = Directory::from_json_str(r#"{"root": "/tmp/img", "entries": ["a", "b/c"]}"#)
            .expect("valid json");
        assert_eq!(dir.root, PathBuf::from("/tmp/img"));
        assert_eq!(dir.entries, vec!["a", "b/c"]);
    }

    #[test]
    fn test_parse_legacy_field_names() {
        let dir = Directory::from_json_str(r#"{"Name": "Dir1", "Files": ["file1"], "Dirs": []}"#)
            .expect("legacy json");
        assert_eq!(dir.root, PathBuf::from("Dir1"));
        assert_eq!(dir.entries, vec!["file1"]);
    }

    #[test]
    fn test_malformed_json_is_input_error() {
        let err = Directory::from_json_str(r#"{"root": "/tmp", "entries": "#).unwrap_err();
        assert!(matches!(err, ImageDiffError::Input { .. }), "{err:?}");
    }

    #[test]
    fn test_duplicate_entries_rejected() {
        let err =
            Directory::from_json_str(r#"{"root": "/tmp", "entries": ["a", "a"]}"#).unwrap_err();
        match err {
            ImageDiffError::Input {
                source: InputErrorKind::DuplicateEntry(entry),
                ..
            } => assert_eq!(entry, "a"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = Directory::from_json_file(Path::new("/nonexistent/dir.json")).unwrap_err();
        assert!(matches!(
            err,
            ImageDiffError::Input {
                source: InputErrorKind::NotFound(_),
                ..
            }
        ));
    }

    #[test]
    fn test_scan_lists_nested_entries_sorted() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("etc/apt")).unwrap();
        std::fs::write(tmp.path().join("etc/apt/sources.list"), "deb x").unwrap();
        std::fs::write(tmp.path().join("README"), "hi").unwrap();

        let dir = Directory::scan(tmp.path()).unwrap();
        assert_eq!(
            dir.entries,
            vec!["README", "etc", "etc/apt", "etc/apt/sources.list"]
        );
        assert_eq!(dir.root, tmp.path());
    }
}
