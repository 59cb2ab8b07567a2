//! Element-wise set difference.

use indexmap::IndexSet;
use std::hash::Hash;

/// Additions and removals between two collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDiff<T> {
    /// Elements of the second collection absent from the first
    pub added: Vec<T>,
    /// Elements of the first collection absent from the second
    pub removed: Vec<T>,
}

impl<T> SetDiff<T> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl<T> Default for SetDiff<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}

/// Diff two insertion-ordered sets.
///
/// Output order follows the iteration order of the source set.
pub fn diff_sets<T>(a: &IndexSet<T>, b: &IndexSet<T>) -> SetDiff<T>
where
    T: Eq + Hash + Clone,
{
    SetDiff {
        added: b.difference(a).cloned().collect(),
        removed: a.difference(b).cloned().collect(),
    }
}

/// Diff two slices, treating each as a set.
///
/// Repeated elements collapse to their first occurrence.
pub fn diff_slices<T>(a: &[T], b: &[T]) -> SetDiff<T>
where
    T: Eq + Hash + Clone,
{
    let a: IndexSet<T> = a.iter().cloned().collect();
    let b: IndexSet<T> = b.iter().cloned().collect();
    diff_sets(&a, &b)
}

/// Elements of `a` that are also in `b`, in `a`'s order.
pub fn intersection<'a, T>(a: &'a [T], b: &[T]) -> Vec<&'a T>
where
    T: Eq + Hash,
{
    let b: IndexSet<&T> = b.iter().collect();
    let mut seen = IndexSet::with_capacity(a.len().min(b.len()));
    a.iter()
        .filter(|item| b.contains(item) && seen.insert(*item))
        .collect()
}
