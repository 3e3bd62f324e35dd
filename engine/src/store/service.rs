//! BlockStore trait definition

use async_trait::async_trait;
use bytes::Bytes;

use super::types::StoreError;
use crate::index::ObjectKey;

/// Opaque put/get/delete storage for serialized cuboid payloads.
///
/// The engine treats payloads as exact serialized cuboids and never interprets
/// the backend's own consistency model; existence questions go through the S3
/// index, not the backend.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Store a block payload under its object key
    async fn put(&self, key: &ObjectKey, payload: Bytes) -> Result<(), StoreError>;

    /// Fetch a block payload, `None` when absent
    async fn get(&self, key: &ObjectKey) -> Result<Option<Bytes>, StoreError>;

    /// Delete a block; absent keys are not an error
    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError>;

    /// Whether a payload exists for this key
    async fn exists(&self, key: &ObjectKey) -> Result<bool, StoreError> {
        Ok(self.get(key).await?.is_some())
    }
}
