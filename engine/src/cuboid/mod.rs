//! Cuboid data model
//!
//! This module provides:
//! - `Cuboid<T>` dense fixed-shape voxel block with bounds-checked indexing
//! - `Element` / `Intensity` / `Label` scalar traits for the supported widths
//! - `MortonId` block-coordinate encoding
//! - `DataType` channel datatype descriptor

mod cube;
mod morton;
mod types;

pub use cube::Cuboid;
pub use morton::MortonId;
pub use types::{CuboidError, DataType, Element, Intensity, Label};
