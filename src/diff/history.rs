//! Build history differ.

use super::result::HistDiff;
use super::set::diff_slices;
use super::traits::Differ;
use crate::error::Result;

/// Diffs two build histories as sets of opaque steps.
///
/// A step that only moved position is not reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryDiffer;

impl Differ for HistoryDiffer {
    type Input = Vec<String>;
    type Output = HistDiff;

    fn diff(&self, h1: &Vec<String>, h2: &Vec<String>) -> Result<HistDiff> {
        let steps = diff_slices(h1, h2);
        tracing::debug!(
            "History diff: {} added, {} removed",
            steps.added.len(),
            steps.removed.len()
        );
        Ok(HistDiff {
            adds: steps.added,
            dels: steps.removed,
            ..HistDiff::default()
        })
    }

    fn name(&self) -> &'static str {
        "history"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(steps: &[&str]) -> Vec<String> {
        steps.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_added_and_removed_steps() {
        let h1 = history(&["/bin/sh -c #(nop) ADD file:abc in /", "/bin/sh -c apt-get update"]);
        let h2 = history(&[
            "/bin/sh -c #(nop) ADD file:abc in /",
            "/bin/sh -c apt-get install -y curl",
        ]);
        let diff = HistoryDiffer.diff(&h1, &h2).unwrap();
        assert_eq!(diff.adds, history(&["/bin/sh -c apt-get install -y curl"]));
        assert_eq!(diff.dels, history(&["/bin/sh -c apt-get update"]));
    }

    #[test]
    fn test_reordering_is_not_a_change() {
        let h1 = history(&["a", "b", "c"]);
        let h2 = history(&["c", "a", "b"]);
        let diff = HistoryDiffer.diff(&h1, &h2).unwrap();
        assert!(diff.adds.is_empty());
        assert!(diff.dels.is_empty());
    }
}
