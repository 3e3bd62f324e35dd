//! Multi-resolution annotation downsampling
//!
//! This module provides:
//! - `vote_quad` label voting resolver over a 2x2 neighborhood
//! - `Factor` anisotropic (1x2x2) / isotropic (2x2x2) reduction factors
//! - `downsample_volume` / `downsample_into` pyramid builders

mod pyramid;
mod vote;

pub use pyramid::{Factor, downsample_into, downsample_volume};
pub use vote::vote_quad;
