//! Diff result structures.

use crate::error::{ImageDiffError, Result};
use crate::model::{FlatPackageMap, LayeredPackageMap, PackageInfo};
use crate::reports::{ReportConfig, ReportFormat, TemplateKind, create_reporter_with_options};
use serde::{Deserialize, Serialize};

/// Build history differences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistDiff {
    pub image1: String,
    pub image2: String,
    /// Steps only in the second image
    pub adds: Vec<String>,
    /// Steps only in the first image
    pub dels: Vec<String>,
}

/// A common entry whose contents could not be compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonFailure {
    pub entry: String,
    pub message: String,
}

/// Filesystem differences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirDiff {
    pub image1: String,
    pub image2: String,
    pub adds: Vec<String>,
    pub dels: Vec<String>,
    /// Common entries with differing contents, in the first image's order
    pub mods: Vec<String>,
    /// Common entries that could not be compared
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ComparisonFailure>,
}

/// A package present in both flat maps with a different version or size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageChange {
    pub name: String,
    pub info1: PackageInfo,
    pub info2: PackageInfo,
}

/// Flat package map differences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDiff {
    pub image1: String,
    pub image2: String,
    pub only_in1: FlatPackageMap,
    pub only_in2: FlatPackageMap,
    pub changed: Vec<PackageChange>,
}

/// Occurrences of a shared package name that found no counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiVersionChange {
    pub name: String,
    pub residue1: Vec<PackageInfo>,
    pub residue2: Vec<PackageInfo>,
}

/// Layered package map differences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiVersionPackageDiff {
    pub image1: String,
    pub image2: String,
    pub only_in1: LayeredPackageMap,
    pub only_in2: LayeredPackageMap,
    pub changed: Vec<MultiVersionChange>,
}

/// Counts shared by every result kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
    pub failures: usize,
}

impl DiffSummary {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.added + self.removed + self.changed
    }
}

/// Result of one diff invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
#[must_use]
pub enum DiffResult {
    History(HistDiff),
    Directory(DirDiff),
    Packages(PackageDiff),
    MultiVersionPackages(MultiVersionPackageDiff),
}

impl DiffResult {
    /// Template this result renders through.
    pub const fn template_kind(&self) -> TemplateKind {
        match self {
            Self::History(_) => TemplateKind::Hist,
            Self::Directory(_) => TemplateKind::Fs,
            Self::Packages(_) => TemplateKind::Single,
            Self::MultiVersionPackages(_) => TemplateKind::Multi,
        }
    }

    /// Labels of the two compared images.
    #[must_use]
    pub fn labels(&self) -> (&str, &str) {
        match self {
            Self::History(d) => (&d.image1, &d.image2),
            Self::Directory(d) => (&d.image1, &d.image2),
            Self::Packages(d) => (&d.image1, &d.image2),
            Self::MultiVersionPackages(d) => (&d.image1, &d.image2),
        }
    }

    /// Stamp the labels of the two compared images.
    pub fn with_labels(mut self, image1: impl Into<String>, image2: impl Into<String>) -> Self {
        let (image1, image2) = (image1.into(), image2.into());
        match &mut self {
            Self::History(d) => (d.image1, d.image2) = (image1, image2),
            Self::Directory(d) => (d.image1, d.image2) = (image1, image2),
            Self::Packages(d) => (d.image1, d.image2) = (image1, image2),
            Self::MultiVersionPackages(d) => (d.image1, d.image2) = (image1, image2),
        }
        self
    }

    #[must_use]
    pub fn summary(&self) -> DiffSummary {
        match self {
            Self::History(d) => DiffSummary {
                added: d.adds.len(),
                removed: d.dels.len(),
                ..DiffSummary::default()
            },
            Self::Directory(d) => DiffSummary {
                added: d.adds.len(),
                removed: d.dels.len(),
                changed: d.mods.len(),
                failures: d.failures.len(),
            },
            Self::Packages(d) => DiffSummary {
                added: d.only_in2.len(),
                removed: d.only_in1.len(),
                changed: d.changed.len(),
                failures: 0,
            },
            Self::MultiVersionPackages(d) => DiffSummary {
                added: d.only_in2.len(),
                removed: d.only_in1.len(),
                changed: d.changed.len(),
                failures: 0,
            },
        }
    }

    /// Whether anything differs between the two images.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.summary().total() > 0
    }

    /// Render the result as JSON or through its kind's text template.
    pub fn output(&self, as_json: bool, config: &ReportConfig) -> Result<String> {
        let format = if as_json {
            ReportFormat::Json
        } else {
            ReportFormat::Text
        };
        create_reporter_with_options(format, config.colored)
            .generate(self, config)
            .map_err(|e| ImageDiffError::Report(e.to_string()))
    }
}
