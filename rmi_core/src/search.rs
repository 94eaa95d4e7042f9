//! Last-mile search: resolving an [`Approximation`] to an exact position.
//!
//! The index guarantees only that the first occurrence of a present key lies
//! inside the returned interval; these helpers finish the lookup with a
//! lower-bound search over that window.

use crate::{Approximation, Key};

/// Algorithm for finding the lower bound of a key in a sorted window,
/// e.g. binary or linear.
pub trait Search {
    /// Index of the first position in `keys[lo..hi)` whose key is not less
    /// than `key`, as an index into the full slice. Returns `hi` when every
    /// key in the window is smaller.
    ///
    /// Assumes `keys` is sorted and `lo <= hi <= keys.len()`.
    fn lower_bound<K: Key>(keys: &[K], lo: usize, hi: usize, key: K) -> usize;

    /// Completes an RMI lookup: the position of the first occurrence of
    /// `key` inside the approximation window, if present there.
    fn lookup<K: Key>(keys: &[K], approx: Approximation, key: K) -> Option<usize> {
        let pos = Self::lower_bound(keys, approx.lo, approx.hi, key);
        (pos < approx.hi && keys[pos] == key).then_some(pos)
    }
}

/// Binary lower-bound search, `O(log n)` in the window size.
/// For small windows, a linear search may be faster.
pub struct BinarySearch;

impl Search for BinarySearch {
    fn lower_bound<K: Key>(keys: &[K], lo: usize, hi: usize, key: K) -> usize {
        lo + keys[lo..hi].partition_point(|&k| k < key)
    }
}

/// Linear lower-bound scan, `O(n)` in the window size.
pub struct LinearSearch;

impl Search for LinearSearch {
    fn lower_bound<K: Key>(keys: &[K], lo: usize, hi: usize, key: K) -> usize {
        let mut index = lo;
        while index < hi && unsafe { *keys.get_unchecked(index) } < key {
            index += 1;
        }
        index
    }
}

/// If a window has less than `LINEAR_SEARCH_THRESHOLD` bytes, use a linear search
const LINEAR_SEARCH_THRESHOLD: usize = 8 * 64;

/// Picks linear or binary search by the byte size of the window.
pub struct OptimalSearch;

impl Search for OptimalSearch {
    fn lower_bound<K: Key>(keys: &[K], lo: usize, hi: usize, key: K) -> usize {
        if (hi - lo) * std::mem::size_of::<K>() > LINEAR_SEARCH_THRESHOLD {
            BinarySearch::lower_bound(keys, lo, hi, key)
        } else {
            LinearSearch::lower_bound(keys, lo, hi, key)
        }
    }
}
