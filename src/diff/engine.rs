//! Diff engine facade.

use super::correlate::CorrelationRules;
use super::directory::{DirectoryDiffer, FailurePolicy};
use super::history::HistoryDiffer;
use super::packages::PackageMapDiffer;
use super::result::DiffResult;
use super::traits::Differ;
use crate::error::{ImageDiffError, Result};
use crate::model::{Directory, PackageMaps};

/// The snapshot one image contributes to a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputContent {
    History(Vec<String>),
    Directory(Directory),
    Packages(PackageMaps),
}

impl InputContent {
    const fn kind_name(&self) -> &'static str {
        match self {
            Self::History(_) => "history",
            Self::Directory(_) => "directory",
            Self::Packages(_) => "package map",
        }
    }
}

/// A labelled snapshot of one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffInput {
    /// How the image is named in the result
    pub label: String,
    pub content: InputContent,
}

impl DiffInput {
    pub fn history(label: impl Into<String>, history: Vec<String>) -> Self {
        Self {
            label: label.into(),
            content: InputContent::History(history),
        }
    }

    pub fn directory(label: impl Into<String>, directory: Directory) -> Self {
        Self {
            label: label.into(),
            content: InputContent::Directory(directory),
        }
    }

    pub fn packages(label: impl Into<String>, packages: PackageMaps) -> Self {
        Self {
            label: label.into(),
            content: InputContent::Packages(packages),
        }
    }
}

/// Selects the differ for a pair of inputs and labels the result.
///
/// The engine is synchronous and holds no state between invocations.
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    correlation: CorrelationRules,
    failure_policy: FailurePolicy,
}

impl DiffEngine {
    /// Create a new diff engine with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the location correlation rules used for layered package maps
    #[must_use]
    pub fn with_correlation(mut self, rules: CorrelationRules) -> Self {
        self.correlation = rules;
        self
    }

    /// Set what happens when a file comparison fails
    #[must_use]
    pub const fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    #[must_use]
    pub const fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Compare two snapshots of the same kind.
    pub fn diff(&self, old: &DiffInput, new: &DiffInput) -> Result<DiffResult> {
        let result = match (&old.content, &new.content) {
            (InputContent::History(h1), InputContent::History(h2)) => {
                DiffResult::History(self.run(&HistoryDiffer, h1, h2)?)
            }
            (InputContent::Directory(d1), InputContent::Directory(d2)) => {
                DiffResult::Directory(self.run(&self.directory_differ(), d1, d2)?)
            }
            (InputContent::Packages(p1), InputContent::Packages(p2)) => {
                self.run(&self.package_differ(), p1, p2)?
            }
            (left, right) => {
                return Err(ImageDiffError::InputKindMismatch {
                    left: left.kind_name().to_string(),
                    right: right.kind_name().to_string(),
                });
            }
        };
        Ok(result.with_labels(old.label.clone(), new.label.clone()))
    }

    /// Compare two build histories.
    pub fn diff_history(&self, h1: &[String], h2: &[String]) -> Result<DiffResult> {
        self.diff(
            &DiffInput::history("", h1.to_vec()),
            &DiffInput::history("", h2.to_vec()),
        )
    }

    /// Compare two filesystem snapshots.
    pub fn diff_directories(&self, d1: &Directory, d2: &Directory) -> Result<DiffResult> {
        Ok(DiffResult::Directory(self.directory_differ().diff(d1, d2)?))
    }

    /// Compare two package inventories.
    pub fn diff_packages(&self, p1: &PackageMaps, p2: &PackageMaps) -> Result<DiffResult> {
        self.package_differ().diff(p1, p2)
    }

    fn directory_differ(&self) -> DirectoryDiffer {
        DirectoryDiffer::new().with_policy(self.failure_policy)
    }

    fn package_differ(&self) -> PackageMapDiffer {
        PackageMapDiffer::new().with_rules(self.correlation.clone())
    }

    fn run<D: Differ>(&self, differ: &D, old: &D::Input, new: &D::Input) -> Result<D::Output> {
        tracing::debug!("Running {} differ", differ.name());
        differ.diff(old, new)
    }
}
