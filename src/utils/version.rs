//! Version comparison utilities.

use std::cmp::Ordering;

/// One run of a version string: all digits or no digits.
#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Number(&'a str),
    Text(&'a str),
}

impl Ord for Segment<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => {
                let a = a.trim_start_matches('0');
                let b = b.trim_start_matches('0');
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Segment<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn segments(version: &str) -> impl Iterator<Item = Segment<'_>> {
    let mut rest = version;
    std::iter::from_fn(move || {
        rest = rest.trim_start_matches(['.', '-', '+', ':', '~', '_']);
        let first = rest.chars().next()?;
        let numeric = first.is_ascii_digit();
        let end = rest
            .find(|c: char| {
                c.is_ascii_digit() != numeric || matches!(c, '.' | '-' | '+' | ':' | '~' | '_')
            })
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(end);
        rest = tail;
        Some(if numeric {
            Segment::Number(head)
        } else {
            Segment::Text(head)
        })
    })
}

/// Compare two version strings.
///
/// Versions are split into digit and non-digit runs. Digit runs compare
/// numerically, other runs lexically, and a digit run sorts before text.
/// Equal run sequences fall back to comparing the raw strings, so the result
/// is a total order usable for sorting.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    segments(a).cmp(segments(b)).then_with(|| a.cmp(b))
}
