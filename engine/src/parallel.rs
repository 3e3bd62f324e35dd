//! Chunked parallel-map helpers for the data-parallel kernels
//!
//! Pyramid building, merging, and cutout post-processing are pure transforms
//! over independent voxels. These helpers run them across the rayon pool with
//! work stealing, with the minimum chunk length as a tunable partitioning
//! parameter so small buffers stay on one thread.

use rayon::prelude::*;

/// Default floor on elements per work unit
pub const DEFAULT_MIN_CHUNK: usize = 4096;

/// Apply `f` to every element of `data` in place, in parallel
pub fn for_each_mut<T, F>(data: &mut [T], min_chunk: usize, f: F)
where
    T: Send,
    F: Fn(&mut T) + Send + Sync,
{
    data.par_iter_mut()
        .with_min_len(min_chunk.max(1))
        .for_each(f);
}

/// Apply `f` to paired elements of `dst` and `src` in place, in parallel.
///
/// Caller guarantees equal lengths; pairs past the shorter slice are skipped.
pub fn zip_for_each<A, B, F>(dst: &mut [A], src: &[B], min_chunk: usize, f: F)
where
    A: Send,
    B: Sync,
    F: Fn(&mut A, &B) + Send + Sync,
{
    dst.par_iter_mut()
        .zip(src.par_iter())
        .with_min_len(min_chunk.max(1))
        .for_each(|(a, b)| f(a, b));
}

/// Produce one output element per paired input, in parallel
pub fn zip_map<A, B, C, F>(left: &[A], right: &[B], min_chunk: usize, f: F) -> Vec<C>
where
    A: Sync,
    B: Sync,
    C: Send,
    F: Fn(&A, &B) -> C + Send + Sync,
{
    left.par_iter()
        .zip(right.par_iter())
        .with_min_len(min_chunk.max(1))
        .map(|(a, b)| f(a, b))
        .collect()
}
