//! Dense fixed-shape voxel block
//!
//! A `Cuboid` is the atomic unit of stored volume data: a dense 3-D block of
//! scalar values in row-major ZYX order (Z slowest, X fastest). Cuboids are
//! immutable once committed to storage; overlapping writes produce a new block
//! via the merge engine rather than mutating in place.

use bytes::{Bytes, BytesMut};
use std::collections::BTreeSet;

use super::types::{CuboidError, Element, Label};

/// A dense block of scalar values over a 3-D grid, shape `[z, y, x]`
#[derive(Debug, Clone, PartialEq)]
pub struct Cuboid<T: Element> {
    dims: [usize; 3],
    data: Vec<T>,
}

impl<T: Element> Cuboid<T> {
    /// Wrap an existing flat buffer; fails unless `data.len() == z*y*x`
    pub fn new(dims: [usize; 3], data: Vec<T>) -> Result<Self, CuboidError> {
        let expected = dims[0] * dims[1] * dims[2];
        if data.len() != expected {
            return Err(CuboidError::LengthMismatch {
                len: data.len(),
                dims,
            });
        }
        Ok(Self { dims, data })
    }

    /// All-background cuboid of the given shape
    pub fn from_zeros(dims: [usize; 3]) -> Self {
        Self {
            dims,
            data: vec![T::zero(); dims[0] * dims[1] * dims[2]],
        }
    }

    /// Cuboid of the given shape with every voxel set to `value`
    pub fn filled(dims: [usize; 3], value: T) -> Self {
        Self {
            dims,
            data: vec![value; dims[0] * dims[1] * dims[2]],
        }
    }

    /// Shape as `[z, y, x]`
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Number of voxels
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat row-major view of the data
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable flat view, for in-place post-processing
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume into the flat buffer
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Flat offset of `(z, y, x)`, if in bounds
    pub fn offset(&self, z: usize, y: usize, x: usize) -> Option<usize> {
        let [dz, dy, dx] = self.dims;
        if z < dz && y < dy && x < dx {
            Some((z * dy + y) * dx + x)
        } else {
            None
        }
    }

    /// Bounds-checked voxel read
    pub fn get(&self, z: usize, y: usize, x: usize) -> Result<T, CuboidError> {
        self.offset(z, y, x)
            .map(|i| self.data[i])
            .ok_or(CuboidError::OutOfBounds {
                z,
                y,
                x,
                dims: self.dims,
            })
    }

    /// Bounds-checked voxel write
    pub fn set(&mut self, z: usize, y: usize, x: usize, value: T) -> Result<(), CuboidError> {
        match self.offset(z, y, x) {
            Some(i) => {
                self.data[i] = value;
                Ok(())
            }
            None => Err(CuboidError::OutOfBounds {
                z,
                y,
                x,
                dims: self.dims,
            }),
        }
    }

    /// One X row at `(z, y)`
    pub fn row(&self, z: usize, y: usize) -> Result<&[T], CuboidError> {
        let start = self.offset(z, y, 0).ok_or(CuboidError::OutOfBounds {
            z,
            y,
            x: 0,
            dims: self.dims,
        })?;
        Ok(&self.data[start..start + self.dims[2]])
    }

    /// Mutable X row at `(z, y)`
    pub fn row_mut(&mut self, z: usize, y: usize) -> Result<&mut [T], CuboidError> {
        let dx = self.dims[2];
        let start = self.offset(z, y, 0).ok_or(CuboidError::OutOfBounds {
            z,
            y,
            x: 0,
            dims: self.dims,
        })?;
        Ok(&mut self.data[start..start + dx])
    }

    /// True when every voxel is the background sentinel
    pub fn is_all_background(&self) -> bool {
        self.data.iter().all(|v| v.is_background())
    }

    /// Serialize to a little-endian payload for the block store
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.data.len() * T::WIDTH);
        for v in &self.data {
            v.put_le(&mut buf);
        }
        buf.freeze()
    }

    /// Decode a payload produced by [`Cuboid::to_bytes`]
    pub fn from_bytes(dims: [usize; 3], payload: &[u8]) -> Result<Self, CuboidError> {
        let voxels = dims[0] * dims[1] * dims[2];
        if payload.len() != voxels * T::WIDTH {
            return Err(CuboidError::PayloadSize {
                len: payload.len(),
                dims,
                width: T::WIDTH,
            });
        }
        let mut buf = payload;
        let mut data = Vec::with_capacity(voxels);
        for _ in 0..voxels {
            data.push(T::get_le(&mut buf));
        }
        Ok(Self { dims, data })
    }
}

impl<T: Label> Cuboid<T> {
    /// Sorted distinct non-background ids present in this block.
    ///
    /// Zero is the reserved "no label" sentinel and is never reported; this is
    /// the set recorded by the annotation index write path.
    pub fn unique_ids(&self) -> BTreeSet<u64> {
        self.data
            .iter()
            .filter(|v| !v.is_background())
            .map(|v| v.widen())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_invariant() {
        assert!(Cuboid::<u8>::new([2, 2, 2], vec![0; 8]).is_ok());
        let err = Cuboid::<u8>::new([2, 2, 2], vec![0; 7]).unwrap_err();
        assert!(matches!(err, CuboidError::LengthMismatch { len: 7, .. }));
    }

    #[test]
    fn test_row_major_offsets() {
        let mut cube = Cuboid::<u32>::from_zeros([2, 3, 4]);
        cube.set(1, 2, 3, 42).unwrap();
        // z slowest, x fastest
        assert_eq!(cube.data()[(1 * 3 + 2) * 4 + 3], 42);
        assert_eq!(cube.get(1, 2, 3).unwrap(), 42);
    }

    #[test]
    fn test_out_of_bounds() {
        let cube = Cuboid::<u32>::from_zeros([2, 2, 2]);
        assert!(matches!(
            cube.get(2, 0, 0),
            Err(CuboidError::OutOfBounds { .. })
        ));
        assert!(cube.offset(0, 0, 2).is_none());
    }

    #[test]
    fn test_rows() {
        let data: Vec<u16> = (0..24).collect();
        let cube = Cuboid::new([2, 3, 4], data).unwrap();
        assert_eq!(cube.row(0, 0).unwrap(), &[0, 1, 2, 3]);
        assert_eq!(cube.row(1, 2).unwrap(), &[20, 21, 22, 23]);
    }

    #[test]
    fn test_payload_round_trip() {
        let data: Vec<u64> = (0..8).map(|v| v * 1000).collect();
        let cube = Cuboid::new([2, 2, 2], data).unwrap();
        let payload = cube.to_bytes();
        assert_eq!(payload.len(), 8 * 8);
        let decoded = Cuboid::<u64>::from_bytes([2, 2, 2], &payload).unwrap();
        assert_eq!(decoded, cube);
    }

    #[test]
    fn test_payload_size_checked() {
        let err = Cuboid::<u32>::from_bytes([2, 2, 2], &[0u8; 31]).unwrap_err();
        assert!(matches!(err, CuboidError::PayloadSize { len: 31, .. }));
    }

    #[test]
    fn test_unique_ids_drop_background() {
        let cube = Cuboid::new([1, 2, 4], vec![0u32, 5, 0, 9, 5, 0, 2, 9]).unwrap();
        let ids: Vec<u64> = cube.unique_ids().into_iter().collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn test_all_background() {
        assert!(Cuboid::<u8>::from_zeros([1, 1, 4]).is_all_background());
        assert!(!Cuboid::<u8>::filled([1, 1, 4], 7).is_all_background());
    }
}
