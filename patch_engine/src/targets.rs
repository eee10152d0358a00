//! Target selection over the address list.
//!
//! Selection happens exactly once per run; the planner and the applier
//! both iterate the same selected sequence, so they always agree on
//! which (index, address) pairs are in play and in what order.

use std::collections::BTreeSet;
use std::fmt;

use log::info;

use crate::error::{PatchError, Result};

/// One selected patch site: its position in the address list and the
/// virtual address recorded there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub index: usize,
    pub address: u64,
}

/// Merged set of excluded address-list indices.
///
/// Built from the two exclusion sources (explicit list and blacklist
/// file) by set union; duplicates collapse and membership tests are
/// O(log n).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclusions(BTreeSet<usize>);

impl Exclusions {
    pub fn merge(explicit: &[usize], from_file: &[usize]) -> Self {
        let mut set = BTreeSet::new();
        set.extend(explicit.iter().copied());
        set.extend(from_file.iter().copied());
        Exclusions(set)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every excluded index must point into the address list.
    pub fn validate(&self, list_len: usize) -> Result<()> {
        match self.0.last() {
            Some(&max) if max >= list_len => Err(PatchError::InvalidIndex {
                index: max,
                len: list_len,
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Exclusions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for index in &self.0 {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{index}")?;
            first = false;
        }
        Ok(())
    }
}

/// Resolve the index range `[start_index, start_index + count)` against
/// the address list. `count < 0` means everything from `start_index` to
/// the end of the list.
pub fn resolve_count(list_len: usize, start_index: usize, count: i64) -> usize {
    if count < 0 {
        list_len.saturating_sub(start_index)
    } else {
        count as usize
    }
}

/// Produce the ordered list of targets to patch: the index range with
/// excluded indices removed, order otherwise preserved.
///
/// A skip notice is logged for each excluded index inside the range.
pub fn select(
    addresses: &[u64],
    start_index: usize,
    count: i64,
    exclusions: &Exclusions,
) -> Result<Vec<Target>> {
    let list_len = addresses.len();
    exclusions.validate(list_len)?;

    if start_index > list_len {
        return Err(PatchError::InvalidIndex {
            index: start_index,
            len: list_len,
        });
    }
    let count = resolve_count(list_len, start_index, count);
    let end = start_index + count;
    if end > list_len {
        return Err(PatchError::InvalidIndex {
            index: end - 1,
            len: list_len,
        });
    }

    let mut selected = Vec::with_capacity(count);
    for index in start_index..end {
        if exclusions.contains(index) {
            info!("skipping index {index} (excluded)");
            continue;
        }
        selected.push(Target {
            index,
            address: addresses[index],
        });
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESSES: [u64; 4] = [0x1000, 0x2000, 0x3000, 0x4000];

    #[test]
    fn selects_full_range_in_order() {
        let targets = select(&ADDRESSES, 0, -1, &Exclusions::default()).unwrap();
        let indices: Vec<_> = targets.iter().map(|t| t.index).collect();
        assert_eq!(indices, [0, 1, 2, 3]);
        assert_eq!(targets[2].address, 0x3000);
    }

    #[test]
    fn negative_count_means_rest_of_list() {
        let targets = select(&ADDRESSES, 1, -1, &Exclusions::default()).unwrap();
        assert_eq!(targets.len(), ADDRESSES.len() - 1);
        assert_eq!(targets[0].index, 1);
    }

    #[test]
    fn removes_excluded_indices_keeping_order() {
        let exclusions = Exclusions::merge(&[1], &[3]);
        let targets = select(&ADDRESSES, 0, -1, &exclusions).unwrap();
        let indices: Vec<_> = targets.iter().map(|t| t.index).collect();
        assert_eq!(indices, [0, 2]);
    }

    #[test]
    fn merge_is_idempotent_and_order_independent() {
        let only_explicit = Exclusions::merge(&[2], &[]);
        let only_file = Exclusions::merge(&[], &[2]);
        let both = Exclusions::merge(&[2], &[2]);
        assert_eq!(only_explicit, only_file);
        assert_eq!(only_explicit, both);

        let ab = Exclusions::merge(&[1, 3], &[2]);
        let ba = Exclusions::merge(&[2], &[3, 1]);
        assert_eq!(ab, ba);
        assert_eq!(ab.to_string(), "1 2 3");
    }

    #[test]
    fn range_past_end_is_invalid() {
        let err = select(&ADDRESSES, 2, 3, &Exclusions::default()).unwrap_err();
        assert_eq!(err, PatchError::InvalidIndex { index: 4, len: 4 });

        let err = select(&ADDRESSES, 5, -1, &Exclusions::default()).unwrap_err();
        assert_eq!(err, PatchError::InvalidIndex { index: 5, len: 4 });
    }

    #[test]
    fn out_of_bounds_exclusion_is_invalid() {
        let exclusions = Exclusions::merge(&[9], &[]);
        let err = select(&ADDRESSES, 0, -1, &exclusions).unwrap_err();
        assert_eq!(err, PatchError::InvalidIndex { index: 9, len: 4 });
    }

    #[test]
    fn empty_range_selects_nothing() {
        let targets = select(&ADDRESSES, 0, 0, &Exclusions::default()).unwrap();
        assert!(targets.is_empty());

        // start_index == len with count < 0 resolves to zero targets.
        let targets = select(&ADDRESSES, 4, -1, &Exclusions::default()).unwrap();
        assert!(targets.is_empty());
    }
}
