//! Layer correlation for packages that occur at several locations.
//!
//! Package managers re-lay the same dependency tree at many build layers. Two
//! occurrences of a package, one per image, are treated as the same install
//! when their version and size agree and their locations correlate:
//!
//! - occurrences under a shared install root (`node_modules/<pkg>`,
//!   `usr/local/lib/node_modules/@scope/<pkg>`, ...) correlate regardless of
//!   the layer they sit in
//! - any other occurrence only correlates with one at the same relative path
//!
//! The pairing is one-to-one. Whatever is left over on either side is the
//! residue reported as a change.

use crate::model::{LocationMap, PackageInfo};
use crate::utils::compare_versions;
use std::cmp::Ordering;

/// Install roots treated as shared when no configuration overrides them.
pub const DEFAULT_SHARED_INSTALL_ROOTS: &[&str] = &[
    "node_modules",
    "usr/local/lib/node_modules",
    "usr/lib/node_modules",
];

/// A location key split into its layer and layer-relative path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationKey<'a> {
    pub layer: Option<&'a str>,
    pub relative: &'a str,
}

impl<'a> LocationKey<'a> {
    /// Split `<layer>/<relative path>`.
    ///
    /// A key without a `/` has no layer; the whole key is the relative path.
    #[must_use]
    pub fn parse(key: &'a str) -> Self {
        match key.split_once('/') {
            Some((layer, relative)) => Self {
                layer: Some(layer),
                relative,
            },
            None => Self {
                layer: None,
                relative: key,
            },
        }
    }
}

/// How an occurrence's relative path is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallScope {
    /// Directly under a shared install root
    Shared,
    /// Anywhere else, including packages nested inside other packages
    Nested,
}

/// Location correlation rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationRules {
    shared_roots: Vec<Vec<String>>,
}

impl Default for CorrelationRules {
    fn default() -> Self {
        Self::new(DEFAULT_SHARED_INSTALL_ROOTS.iter().copied())
    }
}

impl CorrelationRules {
    /// Build rules from a list of shared install roots (`/`-separated).
    pub fn new<I, S>(roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let shared_roots = roots
            .into_iter()
            .map(|root| components(root.as_ref()).map(str::to_string).collect::<Vec<_>>())
            .filter(|root| !root.is_empty())
            .collect();
        Self { shared_roots }
    }

    /// Classify a layer-relative path.
    ///
    /// A path is shared when it ends in `<root>/<pkg>` or `<root>/@scope/<pkg>`
    /// for a configured root, and nothing before the root is itself an
    /// install directory of the same name (which would make it a dependency
    /// nested inside another package).
    #[must_use]
    pub fn scope_of(&self, relative: &str) -> InstallScope {
        let parts: Vec<&str> = components(relative).collect();
        let is_shared = self.shared_roots.iter().any(|root| {
            let scoped = parts.len() >= 2 && parts[parts.len() - 2].starts_with('@');
            let tail = if scoped { 2 } else { 1 };
            let Some(root_start) = parts.len().checked_sub(tail + root.len()) else {
                return false;
            };
            let Some(root_name) = root.last() else {
                return false;
            };
            parts[root_start..parts.len() - tail]
                .iter()
                .zip(root)
                .all(|(part, expected)| part == expected)
                && !parts[..root_start].contains(&root_name.as_str())
        });
        if is_shared {
            InstallScope::Shared
        } else {
            InstallScope::Nested
        }
    }

    /// Whether two location keys may hold the same install.
    #[must_use]
    pub fn locations_correlate(&self, key1: &str, key2: &str) -> bool {
        if key1 == key2 {
            return true;
        }
        let loc1 = LocationKey::parse(key1);
        let loc2 = LocationKey::parse(key2);
        match (self.scope_of(loc1.relative), self.scope_of(loc2.relative)) {
            (InstallScope::Shared, InstallScope::Shared) => true,
            _ => loc1.relative == loc2.relative,
        }
    }

    /// Whether two occurrences are the same installed instance.
    #[must_use]
    pub fn same_instance(&self, occ1: &Occurrence<'_>, occ2: &Occurrence<'_>) -> bool {
        occ1.info.same_install(occ2.info) && self.locations_correlate(occ1.location, occ2.location)
    }

    /// Pair up the occurrences of one package name across two images.
    ///
    /// Occurrences at identical location keys are paired first, then any
    /// remaining correlated occurrences. Each occurrence is consumed at most
    /// once. Residues are sorted by version.
    #[must_use]
    pub fn reconcile(&self, locations1: &LocationMap, locations2: &LocationMap) -> Reconciliation {
        let occurrences1: Vec<Occurrence<'_>> = Occurrence::list(locations1);
        let occurrences2: Vec<Occurrence<'_>> = Occurrence::list(locations2);
        let mut consumed1 = vec![false; occurrences1.len()];
        let mut consumed2 = vec![false; occurrences2.len()];

        let exact = |a: &Occurrence<'_>, b: &Occurrence<'_>| {
            a.location == b.location && a.info.same_install(b.info)
        };
        let correlated = |a: &Occurrence<'_>, b: &Occurrence<'_>| self.same_instance(a, b);

        let mut pairs = 0;
        for matches in [&exact as &dyn Fn(&Occurrence<'_>, &Occurrence<'_>) -> bool, &correlated] {
            for (i, occ1) in occurrences1.iter().enumerate() {
                if consumed1[i] {
                    continue;
                }
                let partner = (0..occurrences2.len())
                    .find(|&j| !consumed2[j] && matches(occ1, &occurrences2[j]));
                if let Some(j) = partner {
                    consumed1[i] = true;
                    consumed2[j] = true;
                    pairs += 1;
                }
            }
        }

        Reconciliation {
            paired: pairs,
            residue1: residue(&occurrences1, &consumed1),
            residue2: residue(&occurrences2, &consumed2),
        }
    }
}

/// One occurrence of a package with the location key it came from.
#[derive(Debug, Clone, Copy)]
pub struct Occurrence<'a> {
    pub location: &'a str,
    pub info: &'a PackageInfo,
}

impl<'a> Occurrence<'a> {
    fn list(locations: &'a LocationMap) -> Vec<Self> {
        locations
            .iter()
            .map(|(location, info)| Self {
                location: location.as_str(),
                info,
            })
            .collect()
    }
}

/// Outcome of reconciling one package name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Number of correlated pairs
    pub paired: usize,
    pub residue1: Vec<PackageInfo>,
    pub residue2: Vec<PackageInfo>,
}

impl Reconciliation {
    /// Whether every occurrence found a counterpart.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.residue1.is_empty() && self.residue2.is_empty()
    }
}

fn residue(occurrences: &[Occurrence<'_>], consumed: &[bool]) -> Vec<PackageInfo> {
    let mut left: Vec<(&str, PackageInfo)> = occurrences
        .iter()
        .zip(consumed)
        .filter(|(_, used)| !**used)
        .map(|(occ, _)| (occ.location, occ.info.clone()))
        .collect();
    left.sort_by(|(loc1, a), (loc2, b)| compare_infos(a, b).then_with(|| loc1.cmp(loc2)));
    left.into_iter().map(|(_, info)| info).collect()
}

fn compare_infos(a: &PackageInfo, b: &PackageInfo) -> Ordering {
    compare_versions(&a.version, &b.version)
        .then_with(|| compare_versions(&a.size, &b.size))
        .then_with(|| a.layer.cmp(&b.layer))
}

fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|part| !part.is_empty() && *part != ".")
}
