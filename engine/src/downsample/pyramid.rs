//! Downsample pyramid builder for annotation channels
//!
//! Reduces a fine-resolution label volume to the next coarser pyramid level by
//! voting over 2x2 XY neighborhoods. The reduction factor is fixed per channel:
//! anisotropic channels keep Z (1x2x2), isotropic channels halve it (2x2x2).
//!
//! In isotropic mode the near Z-plane's vote wins unless it is exactly
//! background, in which case the far plane is voted instead. Labels are never
//! blended across Z; this asymmetry is load-bearing for downsample output and
//! is kept as observed.

use rayon::prelude::*;

use super::vote::vote_quad;
use crate::cuboid::{Cuboid, CuboidError, Label};

/// ZYX reduction factor between adjacent pyramid levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Factor {
    /// 1x2x2: reduce Y and X, keep Z
    Anisotropic,
    /// 2x2x2: reduce all three axes
    Isotropic,
}

impl Factor {
    /// Reduction factor as `[z, y, x]`
    pub fn zyx(&self) -> [usize; 3] {
        match self {
            Factor::Anisotropic => [1, 2, 2],
            Factor::Isotropic => [2, 2, 2],
        }
    }
}

/// Vote the 2x2 XY neighborhood of output voxel `(y, x)` on input plane `z`.
/// Bounds were established by the divisibility check.
fn vote_plane<T: Label>(volume: &Cuboid<T>, z: usize, y: usize, x: usize) -> T {
    let [_, dy, dx] = volume.dims();
    let base = (z * dy + y * 2) * dx + x * 2;
    let data = volume.data();
    vote_quad([data[base], data[base + 1], data[base + dx], data[base + dx + 1]])
}

/// Downsample a label volume by `factor`, producing the next coarser level.
///
/// The volume's dims must divide exactly by the factor; no padding or cropping
/// is performed.
pub fn downsample_volume<T: Label>(
    volume: &Cuboid<T>,
    factor: Factor,
) -> Result<Cuboid<T>, CuboidError> {
    let dims = volume.dims();
    let f = factor.zyx();
    // A zero extent divides evenly but leaves nothing to vote over
    if dims.contains(&0) {
        return Err(CuboidError::EmptyVolume { dims });
    }
    if dims[0] % f[0] != 0 || dims[1] % f[1] != 0 || dims[2] % f[2] != 0 {
        return Err(CuboidError::NotDivisible { dims, factor: f });
    }

    let out_dims = [dims[0] / f[0], dims[1] / f[1], dims[2] / f[2]];
    let [_, out_y, out_x] = out_dims;

    let mut data = vec![T::zero(); out_dims[0] * out_y * out_x];

    // One work unit per output X row; rows are independent
    data.par_chunks_mut(out_x)
        .enumerate()
        .for_each(|(row, out)| {
            let z = row / out_y;
            let y = row % out_y;
            let in_z = z * f[0];
            for (x, voxel) in out.iter_mut().enumerate() {
                let mut value = vote_plane(volume, in_z, y, x);
                if value.is_background() && f[0] == 2 {
                    value = vote_plane(volume, in_z + 1, y, x);
                }
                *voxel = value;
            }
        });

    Cuboid::new(out_dims, data)
}

/// Downsample one sibling block and place its contribution into a larger
/// output mosaic at the given `[z, y, x]` element offset.
///
/// The reduced block must fit inside `output` at `offset`; anything else is a
/// caller contract violation and fails fast.
pub fn downsample_into<T: Label>(
    input: &Cuboid<T>,
    output: &mut Cuboid<T>,
    offset: [usize; 3],
    factor: Factor,
) -> Result<(), CuboidError> {
    let reduced = downsample_volume(input, factor)?;
    let block = reduced.dims();
    let out_dims = output.dims();

    if offset[0] + block[0] > out_dims[0]
        || offset[1] + block[1] > out_dims[1]
        || offset[2] + block[2] > out_dims[2]
    {
        return Err(CuboidError::OffsetOutOfRange {
            offset,
            block,
            dims: out_dims,
        });
    }

    for z in 0..block[0] {
        for y in 0..block[1] {
            let src = reduced.row(z, y)?;
            let dst = output.row_mut(z + offset[0], y + offset[1])?;
            dst[offset[2]..offset[2] + block[2]].copy_from_slice(src);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_cube(dims: [usize; 3], data: Vec<u64>) -> Cuboid<u64> {
        Cuboid::new(dims, data).unwrap()
    }

    #[test]
    fn test_shape_law() {
        let iso = downsample_volume(&Cuboid::<u64>::from_zeros([4, 6, 8]), Factor::Isotropic)
            .unwrap();
        assert_eq!(iso.dims(), [2, 3, 4]);

        let aniso =
            downsample_volume(&Cuboid::<u64>::from_zeros([3, 6, 8]), Factor::Anisotropic)
                .unwrap();
        assert_eq!(aniso.dims(), [3, 3, 4]);
    }

    #[test]
    fn test_not_divisible_fails_fast() {
        let err = downsample_volume(&Cuboid::<u64>::from_zeros([3, 6, 8]), Factor::Isotropic)
            .unwrap_err();
        assert!(matches!(err, CuboidError::NotDivisible { .. }));

        let err =
            downsample_volume(&Cuboid::<u64>::from_zeros([2, 5, 8]), Factor::Anisotropic)
                .unwrap_err();
        assert!(matches!(err, CuboidError::NotDivisible { .. }));
    }

    #[test]
    fn test_zero_extent_fails_fast() {
        // 0 % 2 == 0, so the divisibility check alone would let these through
        for dims in [[2, 2, 0], [0, 4, 4], [2, 0, 2], [0, 0, 0]] {
            let err = downsample_volume(&Cuboid::<u64>::from_zeros(dims), Factor::Isotropic)
                .unwrap_err();
            assert!(
                matches!(err, CuboidError::EmptyVolume { .. }),
                "dims {dims:?}"
            );
        }
    }

    #[test]
    fn test_anisotropic_votes_per_slice() {
        // two Z slices, each a single 2x2 quad
        let cube = label_cube([2, 2, 2], vec![5, 0, 5, 9, 0, 0, 0, 3]);
        let out = downsample_volume(&cube, Factor::Anisotropic).unwrap();
        assert_eq!(out.dims(), [2, 1, 1]);
        assert_eq!(out.get(0, 0, 0).unwrap(), 5); // majority confirms
        assert_eq!(out.get(1, 0, 0).unwrap(), 3); // single survivor
    }

    #[test]
    fn test_isotropic_prefers_near_plane() {
        // near plane votes 5; far plane would vote 9 but is never consulted
        let cube = label_cube([2, 2, 2], vec![5, 5, 0, 0, 9, 9, 9, 9]);
        let out = downsample_volume(&cube, Factor::Isotropic).unwrap();
        assert_eq!(out.get(0, 0, 0).unwrap(), 5);
    }

    #[test]
    fn test_isotropic_falls_through_on_background() {
        // near plane all background, far plane supplies the label
        let cube = label_cube([2, 2, 2], vec![0, 0, 0, 0, 9, 0, 9, 4]);
        let out = downsample_volume(&cube, Factor::Isotropic).unwrap();
        assert_eq!(out.get(0, 0, 0).unwrap(), 9);
    }

    #[test]
    fn test_mosaic_placement() {
        // four sibling 2x2x2 blocks contribute 1x1x1 each into a 2x2x2 corner
        let mut output = Cuboid::<u64>::from_zeros([2, 2, 2]);
        let sibling = label_cube([2, 2, 2], vec![7; 8]);
        downsample_into(&sibling, &mut output, [0, 1, 1], Factor::Isotropic).unwrap();
        assert_eq!(output.get(0, 1, 1).unwrap(), 7);
        assert_eq!(output.get(0, 0, 0).unwrap(), 0);
    }

    #[test]
    fn test_mosaic_offset_checked() {
        let mut output = Cuboid::<u64>::from_zeros([1, 1, 1]);
        let sibling = Cuboid::<u64>::from_zeros([2, 2, 2]);
        let err =
            downsample_into(&sibling, &mut output, [0, 0, 1], Factor::Isotropic).unwrap_err();
        assert!(matches!(err, CuboidError::OffsetOutOfRange { .. }));
    }

    #[test]
    fn test_u32_width_matches_u64() {
        let data32: Vec<u32> = vec![5, 0, 5, 9, 0, 0, 0, 3];
        let data64: Vec<u64> = data32.iter().map(|&v| v as u64).collect();
        let out32 = downsample_volume(
            &Cuboid::new([2, 2, 2], data32).unwrap(),
            Factor::Anisotropic,
        )
        .unwrap();
        let out64 = downsample_volume(
            &Cuboid::new([2, 2, 2], data64).unwrap(),
            Factor::Anisotropic,
        )
        .unwrap();
        let widened: Vec<u64> = out32.data().iter().map(|&v| v as u64).collect();
        assert_eq!(widened, out64.data());
    }
}
