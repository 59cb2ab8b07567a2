//! Property-based tests for the differs.
//!
//! Checks the algebraic laws every diff kind obeys: diffing a snapshot with
//! itself is empty, swapping the inputs swaps the sides of the result, and
//! the names of two inventories are partitioned by the result.

use idiff::diff::{DiffEngine, DiffResult};
use idiff::model::{Directory, FlatPackageMap, LayeredPackageMap, PackageInfo, PackageMaps};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

fn package_info() -> impl Strategy<Value = PackageInfo> {
    ("[0-3]\\.[0-9]", "[1-9][0-9]{0,2}").prop_map(|(version, size)| PackageInfo::new(version, size))
}

fn flat_map() -> impl Strategy<Value = FlatPackageMap> {
    prop::collection::btree_map("pac[0-9]", package_info(), 0..8)
}

fn location() -> impl Strategy<Value = String> {
    prop_oneof![
        "l[0-3]".prop_map(|layer| format!("{layer}/node_modules/pkg")),
        "l[0-3]".prop_map(|layer| format!("{layer}/usr/lib/node_modules/pkg")),
        ("l[0-3]", "(app|srv)").prop_map(|(layer, dir)| format!("{layer}/{dir}/vendor/pkg")),
    ]
}

fn layered_map() -> impl Strategy<Value = LayeredPackageMap> {
    prop::collection::btree_map(
        "pkg[0-4]",
        prop::collection::btree_map(location(), package_info(), 1..4),
        0..5,
    )
}

fn entries() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-e](/[a-e]){0,2}", 0..10)
        .prop_map(|set| set.into_iter().collect())
}

fn diff_packages(p1: PackageMaps, p2: PackageMaps) -> DiffResult {
    DiffEngine::new().diff_packages(&p1, &p2).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn flat_diff_with_itself_is_empty(map in flat_map()) {
        let result = diff_packages(PackageMaps::Flat(map.clone()), PackageMaps::Flat(map));
        prop_assert!(!result.has_changes());
    }

    #[test]
    fn layered_diff_with_itself_is_empty(map in layered_map()) {
        let result = diff_packages(PackageMaps::Layered(map.clone()), PackageMaps::Layered(map));
        prop_assert!(!result.has_changes());
    }

    #[test]
    fn history_diff_with_itself_is_empty(steps in prop::collection::vec("RUN [a-z]{1,6}", 0..10)) {
        let result = DiffEngine::new().diff_history(&steps, &steps).unwrap();
        prop_assert!(!result.has_changes());
    }

    #[test]
    fn flat_diff_is_anti_symmetric(map1 in flat_map(), map2 in flat_map()) {
        let forward = diff_packages(PackageMaps::Flat(map1.clone()), PackageMaps::Flat(map2.clone()));
        let backward = diff_packages(PackageMaps::Flat(map2), PackageMaps::Flat(map1));
        let (DiffResult::Packages(forward), DiffResult::Packages(backward)) = (forward, backward) else {
            panic!("Expected flat package diffs");
        };

        prop_assert_eq!(&forward.only_in1, &backward.only_in2);
        prop_assert_eq!(&forward.only_in2, &backward.only_in1);
        prop_assert_eq!(forward.changed.len(), backward.changed.len());
        for (f, b) in forward.changed.iter().zip(&backward.changed) {
            prop_assert_eq!(&f.name, &b.name);
            prop_assert_eq!(&f.info1, &b.info2);
            prop_assert_eq!(&f.info2, &b.info1);
        }
    }

    #[test]
    fn layered_diff_is_anti_symmetric(map1 in layered_map(), map2 in layered_map()) {
        let forward = diff_packages(PackageMaps::Layered(map1.clone()), PackageMaps::Layered(map2.clone()));
        let backward = diff_packages(PackageMaps::Layered(map2), PackageMaps::Layered(map1));
        let (DiffResult::MultiVersionPackages(forward), DiffResult::MultiVersionPackages(backward)) =
            (forward, backward)
        else {
            panic!("Expected layered package diffs");
        };

        prop_assert_eq!(&forward.only_in1, &backward.only_in2);
        prop_assert_eq!(&forward.only_in2, &backward.only_in1);
        let swapped: BTreeMap<&str, (&Vec<PackageInfo>, &Vec<PackageInfo>)> = backward
            .changed
            .iter()
            .map(|c| (c.name.as_str(), (&c.residue2, &c.residue1)))
            .collect();
        let straight: BTreeMap<&str, (&Vec<PackageInfo>, &Vec<PackageInfo>)> = forward
            .changed
            .iter()
            .map(|c| (c.name.as_str(), (&c.residue1, &c.residue2)))
            .collect();
        prop_assert_eq!(straight, swapped);
    }

    #[test]
    fn flat_diff_partitions_names(map1 in flat_map(), map2 in flat_map()) {
        let DiffResult::Packages(diff) =
            diff_packages(PackageMaps::Flat(map1.clone()), PackageMaps::Flat(map2.clone()))
        else {
            panic!("Expected a flat package diff");
        };

        let names1: BTreeSet<&String> = map1.keys().collect();
        let names2: BTreeSet<&String> = map2.keys().collect();
        let only1: BTreeSet<&String> = diff.only_in1.keys().collect();
        let only2: BTreeSet<&String> = diff.only_in2.keys().collect();
        let common: BTreeSet<&String> = names1.intersection(&names2).copied().collect();

        prop_assert_eq!(&only1, &names1.difference(&names2).copied().collect::<BTreeSet<_>>());
        prop_assert_eq!(&only2, &names2.difference(&names1).copied().collect::<BTreeSet<_>>());
        for change in &diff.changed {
            prop_assert!(common.contains(&change.name));
            prop_assert!(!change.info1.same_install(&change.info2));
        }
        let unchanged = common
            .iter()
            .filter(|name| map1[name.as_str()].same_install(&map2[name.as_str()]))
            .count();
        prop_assert_eq!(diff.changed.len() + unchanged, common.len());
    }

    #[test]
    fn directory_adds_and_dels_partition_entries(e1 in entries(), e2 in entries()) {
        // Disjoint entry lists never stat the (missing) roots.
        let common: Vec<&String> = e1.iter().filter(|e| e2.contains(e)).collect();
        prop_assume!(common.is_empty());

        let d1 = Directory::new("/nonexistent/one", e1.clone());
        let d2 = Directory::new("/nonexistent/two", e2.clone());
        let DiffResult::Directory(diff) = DiffEngine::new().diff_directories(&d1, &d2).unwrap() else {
            panic!("Expected a directory diff");
        };

        prop_assert_eq!(&diff.dels, &e1);
        prop_assert_eq!(&diff.adds, &e2);
        prop_assert!(diff.mods.is_empty());
    }

    #[test]
    fn directory_names_partition_with_overlap(e1 in entries(), e2 in entries()) {
        let d1 = Directory::new("/nonexistent/one", e1.clone());
        let d2 = Directory::new("/nonexistent/two", e2.clone());
        let DiffResult::Directory(diff) = DiffEngine::new().diff_directories(&d1, &d2).unwrap() else {
            panic!("Expected a directory diff");
        };

        let set1: BTreeSet<&String> = e1.iter().collect();
        let set2: BTreeSet<&String> = e2.iter().collect();
        let dels: BTreeSet<&String> = diff.dels.iter().collect();
        let adds: BTreeSet<&String> = diff.adds.iter().collect();
        prop_assert_eq!(dels, set1.difference(&set2).copied().collect::<BTreeSet<_>>());
        prop_assert_eq!(adds, set2.difference(&set1).copied().collect::<BTreeSet<_>>());

        // Every common entry either failed to stat or was compared.
        let common = set1.intersection(&set2).count();
        prop_assert_eq!(diff.mods.len() + diff.failures.len(), common);
    }
}
