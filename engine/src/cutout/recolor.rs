//! Recolor transform for rendering annotation cutouts
//!
//! Maps every non-background label to a palette color chosen by
//! `label % palette_size`, writing into a caller-supplied image buffer.
//! Background positions of the image buffer are left untouched, so a cutout
//! can be composited over an existing rendering. The label input is never
//! mutated.

use crate::cuboid::{CuboidError, Label};
use crate::parallel::{self, DEFAULT_MIN_CHUNK};

/// Palette size matching the reference rendering tables
pub const DEFAULT_PALETTE_SIZE: usize = 217;

/// Fixed-size color table indexed by `label % len`, colors packed RGBA
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<u32>,
}

impl Palette {
    /// Wrap an explicit color table; empty tables are replaced by the default
    pub fn new(colors: Vec<u32>) -> Self {
        if colors.is_empty() {
            return Self::default();
        }
        Self { colors }
    }

    /// Color for a label id
    pub fn color(&self, id: u64) -> u32 {
        self.colors[(id % self.colors.len() as u64) as usize]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Palette {
    /// Deterministic table of [`DEFAULT_PALETTE_SIZE`] opaque colors
    fn default() -> Self {
        let colors = (0..DEFAULT_PALETTE_SIZE as u64)
            .map(|i| {
                // splitmix64 scramble gives well-spread channel values
                let mut h = i.wrapping_add(0x9e37_79b9_7f4a_7c15);
                h = (h ^ (h >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
                h = (h ^ (h >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
                (h ^ (h >> 31)) as u32 | 0xff00_0000 // opaque alpha
            })
            .collect();
        Self { colors }
    }
}

/// Recolor a label cutout into `image`.
///
/// Buffers must have equal voxel counts; positions whose label is background
/// keep whatever `image` already holds.
pub fn recolor_into<T: Label>(
    labels: &[T],
    palette: &Palette,
    image: &mut [u32],
) -> Result<(), CuboidError> {
    if labels.len() != image.len() {
        return Err(CuboidError::BufferMismatch {
            left: labels.len(),
            right: image.len(),
        });
    }

    parallel::zip_for_each(image, labels, DEFAULT_MIN_CHUNK, |px, label| {
        if !label.is_background() {
            *px = palette.color(label.widen());
        }
    });
    Ok(())
}
