//! Package map differ.

use super::correlate::CorrelationRules;
use super::result::{
    DiffResult, MultiVersionChange, MultiVersionPackageDiff, PackageChange, PackageDiff,
};
use super::traits::Differ;
use crate::error::{ImageDiffError, Result};
use crate::model::{FlatPackageMap, LayeredPackageMap, PackageMaps};

/// Diffs two package inventories of the same shape.
#[derive(Debug, Clone, Default)]
pub struct PackageMapDiffer {
    rules: CorrelationRules,
}

impl PackageMapDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom location correlation rules for layered maps.
    #[must_use]
    pub fn with_rules(mut self, rules: CorrelationRules) -> Self {
        self.rules = rules;
        self
    }

    /// Diff two flat maps.
    #[must_use]
    pub fn diff_flat(&self, map1: &FlatPackageMap, map2: &FlatPackageMap) -> PackageDiff {
        let mut diff = PackageDiff::default();

        for (name, info1) in map1 {
            match map2.get(name) {
                None => {
                    diff.only_in1.insert(name.clone(), info1.clone());
                }
                Some(info2) if !info1.same_install(info2) => diff.changed.push(PackageChange {
                    name: name.clone(),
                    info1: info1.clone(),
                    info2: info2.clone(),
                }),
                Some(_) => {}
            }
        }
        for (name, info2) in map2 {
            if !map1.contains_key(name) {
                diff.only_in2.insert(name.clone(), info2.clone());
            }
        }

        tracing::debug!(
            "Flat package diff: {} only in first, {} only in second, {} changed",
            diff.only_in1.len(),
            diff.only_in2.len(),
            diff.changed.len()
        );
        diff
    }

    /// Diff two layered maps, reconciling every name present in both.
    #[must_use]
    pub fn diff_layered(
        &self,
        map1: &LayeredPackageMap,
        map2: &LayeredPackageMap,
    ) -> MultiVersionPackageDiff {
        let mut diff = MultiVersionPackageDiff::default();

        for (name, locations1) in map1 {
            let Some(locations2) = map2.get(name) else {
                diff.only_in1.insert(name.clone(), locations1.clone());
                continue;
            };
            let reconciled = self.rules.reconcile(locations1, locations2);
            if reconciled.is_balanced() {
                continue;
            }
            tracing::trace!(
                "{name}: {} paired, {} left in first, {} left in second",
                reconciled.paired,
                reconciled.residue1.len(),
                reconciled.residue2.len()
            );
            diff.changed.push(MultiVersionChange {
                name: name.clone(),
                residue1: reconciled.residue1,
                residue2: reconciled.residue2,
            });
        }
        for (name, locations2) in map2 {
            if !map1.contains_key(name) {
                diff.only_in2.insert(name.clone(), locations2.clone());
            }
        }

        tracing::debug!(
            "Layered package diff: {} only in first, {} only in second, {} changed",
            diff.only_in1.len(),
            diff.only_in2.len(),
            diff.changed.len()
        );
        diff
    }
}

impl Differ for PackageMapDiffer {
    type Input = PackageMaps;
    type Output = DiffResult;

    /// Both maps must have the same shape; this is checked before any
    /// comparison.
    fn diff(&self, map1: &PackageMaps, map2: &PackageMaps) -> Result<DiffResult> {
        match (map1, map2) {
            (PackageMaps::Flat(m1), PackageMaps::Flat(m2)) => {
                Ok(DiffResult::Packages(self.diff_flat(m1, m2)))
            }
            (PackageMaps::Layered(m1), PackageMaps::Layered(m2)) => {
                Ok(DiffResult::MultiVersionPackages(self.diff_layered(m1, m2)))
            }
            _ => Err(ImageDiffError::shape_mismatch(
                map1.shape().to_string(),
                map2.shape().to_string(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "packages"
    }
}
