//! Filesystem snapshot differ.

use super::content::same_content;
use super::result::{ComparisonFailure, DirDiff};
use super::set::{diff_slices, intersection};
use super::traits::Differ;
use crate::error::{ImageDiffError, Result};
use crate::model::Directory;
use serde::{Deserialize, Serialize};
use std::fs;

/// What to do when one common entry cannot be compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Record the failure in [`DirDiff::failures`] and keep going
    #[default]
    Collect,
    /// Return the first failure
    FailFast,
}

/// Diffs two [`Directory`] snapshots by name and by content.
#[derive(Debug, Clone, Default)]
pub struct DirectoryDiffer {
    policy: FailurePolicy,
}

impl DirectoryDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether the entry differs between the two trees.
    ///
    /// Two directories never differ here; their children are entries of
    /// their own. A directory against a non-directory always differs.
    fn entry_differs(d1: &Directory, d2: &Directory, entry: &str) -> Result<bool> {
        let path1 = d1.path_of(entry);
        let path2 = d2.path_of(entry);
        let meta1 = fs::symlink_metadata(&path1).map_err(|e| ImageDiffError::io(&path1, e))?;
        let meta2 = fs::symlink_metadata(&path2).map_err(|e| ImageDiffError::io(&path2, e))?;

        match (meta1.is_dir(), meta2.is_dir()) {
            (true, true) => Ok(false),
            (true, false) | (false, true) => Ok(true),
            (false, false) => Ok(!same_content(&path1, &path2)?),
        }
    }
}

impl Differ for DirectoryDiffer {
    type Input = Directory;
    type Output = DirDiff;

    fn diff(&self, d1: &Directory, d2: &Directory) -> Result<DirDiff> {
        if d1.is_empty() && d2.is_empty() {
            return Ok(DirDiff::default());
        }

        let names = diff_slices(&d1.entries, &d2.entries);
        let mut result = DirDiff {
            adds: names.added,
            dels: names.removed,
            ..DirDiff::default()
        };

        for entry in intersection(&d1.entries, &d2.entries) {
            match Self::entry_differs(d1, d2, entry) {
                Ok(true) => result.mods.push(entry.clone()),
                Ok(false) => {}
                Err(e) => match self.policy {
                    FailurePolicy::FailFast => return Err(e),
                    FailurePolicy::Collect => {
                        tracing::warn!("Could not compare {entry}: {e}");
                        result.failures.push(ComparisonFailure {
                            entry: entry.clone(),
                            message: e.to_string(),
                        });
                    }
                },
            }
        }

        tracing::debug!(
            "Directory diff: {} added, {} removed, {} modified, {} failed",
            result.adds.len(),
            result.dels.len(),
            result.mods.len(),
            result.failures.len()
        );
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "directory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, entry: &str, content: &str) {
        let path = root.join(entry);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn entries(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_both_empty_short_circuits() {
        // Roots do not exist; any stat would fail.
        let d1 = Directory::new("/nonexistent/one", vec![]);
        let d2 = Directory::new("/nonexistent/two", vec![]);
        let diff = DirectoryDiffer::new().diff(&d1, &d2).unwrap();
        assert_eq!(diff, DirDiff::default());
    }

    #[test]
    fn test_one_side_empty_is_computed() {
        let d1 = Directory::new("/nonexistent/one", vec![]);
        let d2 = Directory::new("/nonexistent/two", entries(&["file1"]));
        let diff = DirectoryDiffer::new().diff(&d1, &d2).unwrap();
        assert_eq!(diff.adds, entries(&["file1"]));
        assert!(diff.dels.is_empty());
        assert!(diff.mods.is_empty());
    }

    #[test]
    fn test_additions_only() {
        let t1 = TempDir::new().unwrap();
        let t2 = TempDir::new().unwrap();
        write(t1.path(), "file1", "same");
        write(t2.path(), "file1", "same");
        write(t2.path(), "file2", "new");

        let d1 = Directory::new(t1.path(), entries(&["file1"]));
        let d2 = Directory::new(t2.path(), entries(&["file1", "file2"]));
        let diff = DirectoryDiffer::new().diff(&d1, &d2).unwrap();
        assert_eq!(diff.adds, entries(&["file2"]));
        assert!(diff.dels.is_empty());
        assert!(diff.mods.is_empty());
    }

    #[test]
    fn test_mods_follow_first_order_and_skip_directories() {
        let t1 = TempDir::new().unwrap();
        let t2 = TempDir::new().unwrap();
        for (root, suffix) in [(t1.path(), "1"), (t2.path(), "2")] {
            write(root, "etc/hosts", &format!("hosts {suffix}"));
            write(root, "etc/motd", "unchanged");
            write(root, "bin/tool", &format!("tool {suffix}"));
        }

        let d1 = Directory::new(
            t1.path(),
            entries(&["etc", "etc/motd", "etc/hosts", "bin", "bin/tool"]),
        );
        let d2 = Directory::new(
            t2.path(),
            entries(&["bin", "bin/tool", "etc", "etc/hosts", "etc/motd"]),
        );
        let diff = DirectoryDiffer::new().diff(&d1, &d2).unwrap();
        assert_eq!(diff.mods, entries(&["etc/hosts", "bin/tool"]));
        assert!(diff.failures.is_empty());
    }

    #[test]
    fn test_directory_replaced_by_file_is_modified() {
        let t1 = TempDir::new().unwrap();
        let t2 = TempDir::new().unwrap();
        fs::create_dir(t1.path().join("data")).unwrap();
        write(t2.path(), "data", "now a file");

        let d1 = Directory::new(t1.path(), entries(&["data"]));
        let d2 = Directory::new(t2.path(), entries(&["data"]));
        let diff = DirectoryDiffer::new().diff(&d1, &d2).unwrap();
        assert_eq!(diff.mods, entries(&["data"]));
    }

    #[test]
    fn test_failures_are_collected_per_entry() {
        let t1 = TempDir::new().unwrap();
        let t2 = TempDir::new().unwrap();
        write(t1.path(), "good", "a");
        write(t2.path(), "good", "b");
        write(t1.path(), "gone", "a");

        let d1 = Directory::new(t1.path(), entries(&["gone", "good"]));
        let d2 = Directory::new(t2.path(), entries(&["gone", "good"]));
        let diff = DirectoryDiffer::new().diff(&d1, &d2).unwrap();
        assert_eq!(diff.mods, entries(&["good"]));
        assert_eq!(diff.failures.len(), 1);
        assert_eq!(diff.failures[0].entry, "gone");
    }

    #[test]
    fn test_fail_fast_returns_io_error() {
        let t1 = TempDir::new().unwrap();
        let t2 = TempDir::new().unwrap();
        write(t1.path(), "gone", "a");

        let d1 = Directory::new(t1.path(), entries(&["gone"]));
        let d2 = Directory::new(t2.path(), entries(&["gone"]));
        let err = DirectoryDiffer::new()
            .with_policy(FailurePolicy::FailFast)
            .diff(&d1, &d2)
            .unwrap_err();
        assert!(err.is_io());
    }
}
