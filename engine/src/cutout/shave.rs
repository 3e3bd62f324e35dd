//! Shave transform: subtract a mask volume from a dense block
//!
//! Zeros every voxel of the primary volume wherever the mask is non-zero,
//! used to remove a previously-extracted entity from a dense block before
//! re-merging it.

use crate::cuboid::{Cuboid, CuboidError, Element};
use crate::parallel::{self, DEFAULT_MIN_CHUNK};

/// Zero `data` wherever `mask` is non-background. Shapes must match.
pub fn shave_dense<T, M>(data: &mut Cuboid<T>, mask: &Cuboid<M>) -> Result<(), CuboidError>
where
    T: Element,
    M: Element,
{
    if data.dims() != mask.dims() {
        return Err(CuboidError::ShapeMismatch {
            expected: data.dims(),
            actual: mask.dims(),
        });
    }

    parallel::zip_for_each(data.data_mut(), mask.data(), DEFAULT_MIN_CHUNK, |v, m| {
        if !m.is_background() {
            *v = T::zero();
        }
    });
    Ok(())
}
