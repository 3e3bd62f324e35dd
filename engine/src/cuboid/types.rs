//! Cuboid element types and error definitions

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use thiserror::Error;

/// Errors that can occur when constructing or transforming cuboids
#[derive(Debug, Error)]
pub enum CuboidError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: [usize; 3],
        actual: [usize; 3],
    },

    #[error("Data length {len} does not match dims {dims:?}")]
    LengthMismatch { len: usize, dims: [usize; 3] },

    #[error("Buffer length mismatch: {left} vs {right}")]
    BufferMismatch { left: usize, right: usize },

    #[error("Voxel index out of bounds: ({z}, {y}, {x}) in {dims:?}")]
    OutOfBounds {
        z: usize,
        y: usize,
        x: usize,
        dims: [usize; 3],
    },

    #[error("Dims {dims:?} are not divisible by reduction factor {factor:?}")]
    NotDivisible {
        dims: [usize; 3],
        factor: [usize; 3],
    },

    #[error("Volume with zero-extent dims {dims:?} cannot be reduced")]
    EmptyVolume { dims: [usize; 3] },

    #[error("Offset {offset:?} plus block {block:?} exceeds output dims {dims:?}")]
    OffsetOutOfRange {
        offset: [usize; 3],
        block: [usize; 3],
        dims: [usize; 3],
    },

    #[error("Annotation datatype {0:?} cannot be blended; labels are never averaged")]
    AnnotationBlend(DataType),

    #[error("Payload of {len} bytes does not decode to dims {dims:?} at {width} bytes/voxel")]
    PayloadSize {
        len: usize,
        dims: [usize; 3],
        width: usize,
    },
}

/// Voxel datatype of a channel, fixed at channel-creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// 8-bit image channel
    Uint8,
    /// 16-bit image channel
    Uint16,
    /// 32-bit image channel
    Uint32,
    /// 32-bit float image channel
    Float32,
    /// 32-bit annotation (label) channel
    Annotation32,
    /// 64-bit annotation (label) channel
    Annotation64,
}

impl DataType {
    /// Bytes per voxel
    pub fn width(&self) -> usize {
        match self {
            DataType::Uint8 => 1,
            DataType::Uint16 => 2,
            DataType::Uint32 | DataType::Float32 | DataType::Annotation32 => 4,
            DataType::Annotation64 => 8,
        }
    }

    /// Whether voxel values are object identifiers rather than intensities
    pub fn is_annotation(&self) -> bool {
        matches!(self, DataType::Annotation32 | DataType::Annotation64)
    }
}

/// Scalar voxel element stored in a cuboid.
///
/// The default value is the background sentinel (`0` / `0.0`), which annotation
/// channels reserve for "no label".
pub trait Element: Copy + Default + PartialEq + Send + Sync + 'static {
    /// Bytes per element in the serialized payload
    const WIDTH: usize;

    /// Background sentinel
    fn zero() -> Self {
        Self::default()
    }

    /// True for the background sentinel
    fn is_background(&self) -> bool {
        *self == Self::default()
    }

    /// Append this element to a payload buffer (little-endian)
    fn put_le(self, buf: &mut impl BufMut);

    /// Read one element from a payload buffer (little-endian)
    fn get_le(buf: &mut impl Buf) -> Self;
}

macro_rules! impl_element_int {
    ($t:ty, $width:expr, $put:ident, $get:ident) => {
        impl Element for $t {
            const WIDTH: usize = $width;

            fn put_le(self, buf: &mut impl BufMut) {
                buf.$put(self);
            }

            fn get_le(buf: &mut impl Buf) -> Self {
                buf.$get()
            }
        }
    };
}

impl_element_int!(u8, 1, put_u8, get_u8);
impl_element_int!(u16, 2, put_u16_le, get_u16_le);
impl_element_int!(u32, 4, put_u32_le, get_u32_le);
impl_element_int!(u64, 8, put_u64_le, get_u64_le);

impl Element for f32 {
    const WIDTH: usize = 4;

    fn put_le(self, buf: &mut impl BufMut) {
        buf.put_f32_le(self);
    }

    fn get_le(buf: &mut impl Buf) -> Self {
        buf.get_f32_le()
    }
}

/// Intensity element that supports the zero-absorbing averaging blend.
///
/// Annotation widths deliberately do not implement this trait; label merges go
/// through the voting resolver instead.
pub trait Intensity: Element {
    /// Arithmetic mean of two non-background values, truncating for integers
    fn blend(self, other: Self) -> Self;
}

macro_rules! impl_intensity_int {
    ($t:ty, $wide:ty) => {
        impl Intensity for $t {
            fn blend(self, other: Self) -> Self {
                ((self as $wide + other as $wide) / 2) as $t
            }
        }
    };
}

impl_intensity_int!(u8, u16);
impl_intensity_int!(u16, u32);
impl_intensity_int!(u32, u64);

impl Intensity for f32 {
    fn blend(self, other: Self) -> Self {
        (self + other) / 2.0
    }
}

/// Annotation label element (32- or 64-bit object identifier)
pub trait Label: Element + Eq + Hash + Ord {
    /// Widen to the canonical 64-bit id used by the annotation index
    fn widen(self) -> u64;
}

impl Label for u32 {
    fn widen(self) -> u64 {
        self as u64
    }
}

impl Label for u64 {
    fn widen(self) -> u64 {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datatype_width() {
        assert_eq!(DataType::Uint8.width(), 1);
        assert_eq!(DataType::Uint16.width(), 2);
        assert_eq!(DataType::Float32.width(), 4);
        assert_eq!(DataType::Annotation64.width(), 8);
    }

    #[test]
    fn test_datatype_annotation_flag() {
        assert!(DataType::Annotation32.is_annotation());
        assert!(DataType::Annotation64.is_annotation());
        assert!(!DataType::Uint16.is_annotation());
        assert!(!DataType::Float32.is_annotation());
    }

    #[test]
    fn test_integer_blend_truncates() {
        assert_eq!(4u8.blend(6), 5);
        assert_eq!(4u8.blend(7), 5);
        assert_eq!(250u8.blend(250), 250); // widened arithmetic, no overflow
        assert_eq!(u32::MAX.blend(u32::MAX), u32::MAX);
    }

    #[test]
    fn test_float_blend_exact() {
        assert_eq!(1.0f32.blend(2.0), 1.5);
    }

    #[test]
    fn test_background_sentinel() {
        assert!(0u32.is_background());
        assert!(!1u32.is_background());
        assert!(0.0f32.is_background());
    }
}
