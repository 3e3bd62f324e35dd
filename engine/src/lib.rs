//! Voxelstore Engine Library
//!
//! The cuboid processing core of the voxelstore spatial database: annotation
//! downsampling, block merging, cutout post-processing, and the sparse
//! annotation index that ties ids to the physical blocks containing them.

pub mod config;
pub mod cuboid;
pub mod cutout;
pub mod downsample;
pub mod index;
pub mod merge;
pub mod parallel;
pub mod store;

// Re-export commonly used types
pub use cuboid::{Cuboid, CuboidError, DataType, MortonId};
pub use downsample::{Factor, downsample_into, downsample_volume, vote_quad};
pub use index::{AnnotationIndex, IngestJob, LookupKey, ObjectKey};
pub use store::BlockStore;
