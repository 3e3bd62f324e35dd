//! Block store boundary
//!
//! This module provides:
//! - `BlockStore` trait for opaque put/get/delete of cuboid payloads
//! - `InMemoryBlockStore` reference implementation
//! - `CuboidCache` byte-weighed LRU in front of the backend

mod cache;
mod memory;
mod service;
mod types;

pub use cache::{CuboidCache, CuboidCacheConfig, CuboidCacheStats};
pub use memory::InMemoryBlockStore;
pub use service::BlockStore;
pub use types::StoreError;
