//! Cuboid merge engine for intensity channels
//!
//! Combines two cuboids covering the same block, as produced by concurrent
//! ingest of overlapping regions. The rule is elementwise: a background voxel
//! yields to the other side's value, and two populated voxels blend to their
//! arithmetic mean (truncated for integers). The blend is commutative and
//! lossy, intended for intensity data only; annotation channels must never be
//! averaged and are rejected at the boundary.

use crate::cuboid::{Cuboid, CuboidError, DataType, Intensity};
use crate::parallel::{self, DEFAULT_MIN_CHUNK};

/// Reject annotation datatypes before any merge work is done.
///
/// Label merges go through the voting resolver or a last-writer-wins policy in
/// the ingest pipeline; averaging object identifiers is a caller error.
pub fn ensure_blendable(datatype: DataType) -> Result<(), CuboidError> {
    if datatype.is_annotation() {
        return Err(CuboidError::AnnotationBlend(datatype));
    }
    Ok(())
}

/// Merge two same-shape intensity cuboids into a new block.
///
/// Neither input is mutated; committed cuboids are immutable and an
/// overlapping write always produces a fresh block.
pub fn merge<T: Intensity>(a: &Cuboid<T>, b: &Cuboid<T>) -> Result<Cuboid<T>, CuboidError> {
    if a.dims() != b.dims() {
        return Err(CuboidError::ShapeMismatch {
            expected: a.dims(),
            actual: b.dims(),
        });
    }

    let data = parallel::zip_map(a.data(), b.data(), DEFAULT_MIN_CHUNK, |&x, &y| {
        if x.is_background() {
            y
        } else if y.is_background() {
            x
        } else {
            x.blend(y)
        }
    });

    Cuboid::new(a.dims(), data)
}
