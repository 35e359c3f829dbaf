//! First-fit-decreasing packing of demand into truck loads.
//!
//! # Algorithm
//!
//! Items are sorted by size, largest first (ties keep their input order),
//! and each goes into the first open bin with enough room left; a new bin is
//! opened when none has.
//!
//! Since a truck carries a single product on a single trip, the bins of one
//! product are the trips needed to serve it, and their count is a fleet size
//! that is known to be routable.
//!
//! # Complexity
//!
//! O(n · b) where n = items and b = bins opened.
//!
//! # Reference
//!
//! Johnson, D. S. (1973). "Near-optimal bin packing algorithms", PhD thesis,
//! MIT.

use std::cmp::Reverse;

/// One packed bin.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackedBin {
    /// Item keys in packing order.
    pub items: Vec<usize>,
    /// Sum of item sizes.
    pub load: i64,
}

/// Packs `(key, size)` items into bins of `capacity`.
///
/// An item larger than `capacity` still gets a bin of its own, so every key
/// appears in exactly one bin.
///
/// # Examples
///
/// ```
/// use tanker_routing::solver::first_fit_decreasing;
///
/// let bins = first_fit_decreasing(&[(0, 3), (1, 7), (2, 5), (3, 5)], 10);
/// assert_eq!(bins.len(), 2);
/// assert_eq!(bins[0].items, vec![1, 0]);
/// assert_eq!(bins[1].items, vec![2, 3]);
/// ```
pub fn first_fit_decreasing(items: &[(usize, i64)], capacity: i64) -> Vec<PackedBin> {
    let mut sorted = items.to_vec();
    sorted.sort_by_key(|&(_, size)| Reverse(size));

    let mut bins: Vec<PackedBin> = Vec::new();
    for (key, size) in sorted {
        match bins.iter_mut().find(|b| b.load + size <= capacity) {
            Some(bin) => {
                bin.items.push(key);
                bin.load += size;
            }
            None => bins.push(PackedBin {
                items: vec![key],
                load: size,
            }),
        }
    }
    bins
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty() {
        assert!(first_fit_decreasing(&[], 10).is_empty());
    }

    #[test]
    fn test_exact_fit_shares_bin() {
        let bins = first_fit_decreasing(&[(0, 4), (1, 6)], 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].load, 10);
    }

    #[test]
    fn test_oversized_item_alone() {
        let bins = first_fit_decreasing(&[(0, 12), (1, 2)], 10);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].items, vec![0]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let bins = first_fit_decreasing(&[(5, 6), (2, 6), (9, 6)], 10);
        let order: Vec<usize> = bins.iter().flat_map(|b| b.items.clone()).collect();
        assert_eq!(order, vec![5, 2, 9]);
    }

    proptest! {
        #[test]
        fn prop_bins_partition_items(
            sizes in proptest::collection::vec(1i64..=50, 0..40),
            capacity in 50i64..120,
        ) {
            let items: Vec<(usize, i64)> = sizes.iter().copied().enumerate().collect();
            let bins = first_fit_decreasing(&items, capacity);

            let mut keys: Vec<usize> = bins.iter().flat_map(|b| b.items.clone()).collect();
            keys.sort_unstable();
            prop_assert_eq!(keys, (0..sizes.len()).collect::<Vec<_>>());

            let total: i64 = sizes.iter().sum();
            prop_assert!(bins.len() as i64 >= (total + capacity - 1) / capacity);
            for bin in &bins {
                prop_assert!(bin.load <= capacity);
                prop_assert_eq!(bin.load, bin.items.iter().map(|&k| sizes[k]).sum::<i64>());
            }
        }
    }
}
