//! Filter transform for id-restricted cutouts
//!
//! Zeros every voxel whose label is not in the caller-supplied inclusion list.
//! Membership is a true set test, independent of list ordering; the historical
//! shortcut of comparing against the last-checked value of a sorted list drops
//! valid labels and is deliberately not reproduced.

use indexmap::IndexSet;

use crate::cuboid::Label;
use crate::parallel::{self, DEFAULT_MIN_CHUNK};

/// Keep only the listed labels, zeroing everything else in place.
///
/// Idempotent: a second pass with the same list is a no-op.
pub fn filter_in_place<T: Label>(cutout: &mut [T], allowed: &[T]) {
    let allowed: IndexSet<T> = allowed.iter().copied().collect();
    parallel::for_each_mut(cutout, DEFAULT_MIN_CHUNK, |voxel| {
        if !voxel.is_background() && !allowed.contains(voxel) {
            *voxel = T::zero();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_listed_ids_only() {
        let mut cutout = vec![1u32, 2, 3, 4, 5, 2, 0];
        filter_in_place(&mut cutout, &[2, 5]);
        assert_eq!(cutout, vec![0, 2, 0, 0, 5, 2, 0]);
    }

    #[test]
    fn test_order_independent() {
        let mut a = vec![9u64, 1, 5, 7];
        let mut b = a.clone();
        filter_in_place(&mut a, &[7, 1]);
        filter_in_place(&mut b, &[1, 7]);
        assert_eq!(a, b);
        assert_eq!(a, vec![0, 1, 0, 7]);
    }

    #[test]
    fn test_unsorted_list_keeps_small_ids() {
        // a sorted-boundary shortcut would drop the 1 after matching 900
        let mut cutout = vec![900u64, 1, 900, 1];
        filter_in_place(&mut cutout, &[900, 1]);
        assert_eq!(cutout, vec![900, 1, 900, 1]);
    }

    #[test]
    fn test_idempotent() {
        let mut once = vec![3u32, 8, 0, 12, 3];
        filter_in_place(&mut once, &[3]);
        let mut twice = once.clone();
        filter_in_place(&mut twice, &[3]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_list_clears_all() {
        let mut cutout = vec![4u32, 0, 6];
        filter_in_place(&mut cutout, &[]);
        assert_eq!(cutout, vec![0, 0, 0]);
    }
}
