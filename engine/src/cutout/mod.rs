//! Stateless post-processors for assembled cutout buffers
//!
//! This module provides:
//! - `recolor_into` palette rendering of annotation cutouts
//! - `filter_in_place` id-inclusion filtering
//! - `shave_dense` mask subtraction
//!
//! All three are embarrassingly data-parallel across voxels and run on the
//! rayon pool via the chunked helpers in [`crate::parallel`].

mod filter;
mod recolor;
mod shave;

pub use filter::filter_in_place;
pub use recolor::{DEFAULT_PALETTE_SIZE, Palette, recolor_into};
pub use shave::shave_dense;
