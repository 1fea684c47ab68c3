//! Jaccard similarity between domain sets.
//!
//! `J(A, B) = |A ∩ B| / |A ∪ B|`, defined as `0` when either set is empty.
//!
//! Two forms are provided. [`jaccard`] works on any ordered set and is the
//! reference definition. [`sorted_jaccard`] works on strictly increasing slices
//! of interned ids and is what the pairwise scan uses: a single linear merge
//! per pair with no allocation.

use std::collections::{BTreeSet, HashMap};

/// Jaccard coefficient of two sets.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Jaccard coefficient of two strictly increasing slices.
///
/// Both inputs must be sorted and free of duplicates, as produced by
/// [`DomainInterner::intern`].
pub fn sorted_jaccard(a: &[u32], b: &[u32]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = sorted_intersection_len(a, b);
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

fn sorted_intersection_len(a: &[u32], b: &[u32]) -> usize {
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}

/// Maps domain identifiers to dense integer ids.
///
/// Ids are assigned in first-seen order; only equality matters for similarity,
/// so the assignment order has no effect on results.
#[derive(Debug, Default, Clone)]
pub struct DomainInterner {
    ids: HashMap<String, u32>,
}

impl DomainInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns every domain in `domains` and returns the sorted id set.
    pub fn intern<'a, I>(&mut self, domains: I) -> Vec<u32>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut set: Vec<u32> = domains
            .into_iter()
            .map(|domain| {
                let next = self.ids.len() as u32;
                *self.ids.entry(domain.clone()).or_insert(next)
            })
            .collect();
        set.sort_unstable();
        set.dedup();
        set
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn jaccard_matches_worked_example() {
        let a = set(&["IPR001", "IPR002", "IPR003", "IPR004"]);
        let b = set(&["IPR001", "IPR003", "IPR005"]);
        assert_eq!(jaccard(&a, &b), 0.4);
    }

    #[test]
    fn jaccard_is_symmetric() {
        let a = set(&["IPR001", "IPR002", "IPR007"]);
        let b = set(&["IPR002", "IPR009"]);
        assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
    }

    #[test]
    fn jaccard_of_a_set_with_itself_is_one() {
        let a = set(&["IPR001", "IPR002"]);
        assert_eq!(jaccard(&a, &a), 1.0);
    }

    #[test]
    fn jaccard_is_zero_when_either_set_is_empty() {
        let a = set(&["IPR001"]);
        let empty = BTreeSet::new();
        assert_eq!(jaccard(&a, &empty), 0.0);
        assert_eq!(jaccard(&empty, &a), 0.0);
        assert_eq!(jaccard::<String>(&empty, &empty), 0.0);
    }

    #[test]
    fn jaccard_is_zero_for_disjoint_sets() {
        let a = set(&["IPR001"]);
        let b = set(&["IPR002"]);
        assert_eq!(jaccard(&a, &b), 0.0);
    }

    #[test]
    fn jaccard_stays_within_unit_interval() {
        let families = [
            set(&["IPR001"]),
            set(&["IPR001", "IPR002"]),
            set(&["IPR002", "IPR003", "IPR004"]),
            set(&["IPR005", "IPR001", "IPR003", "IPR006", "IPR007"]),
        ];
        for a in &families {
            for b in &families {
                let j = jaccard(a, b);
                assert!((0.0..=1.0).contains(&j), "out of bounds: {}", j);
            }
        }
    }

    #[test]
    fn sorted_jaccard_agrees_with_set_jaccard() {
        let a = set(&["IPR001", "IPR002", "IPR003", "IPR004"]);
        let b = set(&["IPR001", "IPR003", "IPR005"]);

        let mut interner = DomainInterner::new();
        let ia = interner.intern(a.iter());
        let ib = interner.intern(b.iter());

        assert_eq!(sorted_jaccard(&ia, &ib), jaccard(&a, &b));
        assert_eq!(sorted_jaccard(&ib, &ia), jaccard(&b, &a));
        assert_eq!(interner.len(), 5);
    }

    #[test]
    fn sorted_jaccard_is_zero_for_empty_input() {
        assert_eq!(sorted_jaccard(&[], &[1, 2]), 0.0);
        assert_eq!(sorted_jaccard(&[1], &[]), 0.0);
    }

    #[test]
    fn intern_reuses_ids_for_repeated_domains() {
        let mut interner = DomainInterner::new();
        let first = interner.intern(set(&["IPR010", "IPR020"]).iter());
        let second = interner.intern(set(&["IPR020", "IPR010"]).iter());
        assert_eq!(first, second);
        assert_eq!(interner.len(), 2);
    }
}
