// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Selection normalization and unordered pair enumeration.

use rustc_hash::FxHashSet;

/// A selection with duplicate identifiers collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<'a> {
    /// Distinct identifiers in first-occurrence order
    pub names: Vec<&'a str>,
    /// Identifiers that were dropped as repeats, in encounter order
    pub duplicates: Vec<&'a str>,
}

impl<'a> Selection<'a> {
    pub fn new<S: AsRef<str>>(identifiers: &'a [S]) -> Self {
        let mut seen = FxHashSet::default();
        let mut names = Vec::with_capacity(identifiers.len());
        let mut duplicates = Vec::new();

        for id in identifiers {
            let id = id.as_ref();
            if seen.insert(id) {
                names.push(id);
            } else {
                duplicates.push(id);
            }
        }

        Self { names, duplicates }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Number of unordered pairs among `n` items
#[inline]
pub fn pair_count(n: usize) -> usize {
    n.saturating_sub(1) * n / 2
}

/// Every `(i, j)` with `i < j < n`, ordered by `i` then `j`.
pub fn unordered_pairs(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |i| (i + 1..n).map(move |j| (i, j)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse_to_first_occurrence() {
        let ids = ["B", "A", "B", "C", "A"];
        let selection = Selection::new(&ids);
        assert_eq!(selection.names, vec!["B", "A", "C"]);
        assert_eq!(selection.duplicates, vec!["B", "A"]);
    }

    #[test]
    fn test_owned_identifiers() {
        let ids = vec!["A".to_string(), "A".to_string()];
        let selection = Selection::new(&ids);
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_pairs_in_selection_order() {
        let pairs: Vec<_> = unordered_pairs(3).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn test_pairs_never_reflexive_or_repeated() {
        for n in 0..8 {
            let pairs: Vec<_> = unordered_pairs(n).collect();
            assert_eq!(pairs.len(), pair_count(n));
            assert!(pairs.iter().all(|&(i, j)| i < j && j < n));
        }
    }

    #[test]
    fn test_pair_count_small() {
        assert_eq!(pair_count(0), 0);
        assert_eq!(pair_count(1), 0);
        assert_eq!(pair_count(2), 1);
        assert_eq!(pair_count(5), 10);
    }
}
