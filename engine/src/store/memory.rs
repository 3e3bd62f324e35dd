//! In-memory block store for tests and single-node use

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;

use super::service::BlockStore;
use super::types::StoreError;
use crate::index::ObjectKey;

/// Block store backed by process memory, keyed by rendered object key
#[derive(Default)]
pub struct InMemoryBlockStore {
    blocks: DashMap<String, Bytes>,
}

impl InMemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[async_trait]
impl BlockStore for InMemoryBlockStore {
    async fn put(&self, key: &ObjectKey, payload: Bytes) -> Result<(), StoreError> {
        debug!(key = %key, bytes = payload.len(), "storing block");
        self.blocks.insert(key.to_key_string(), payload);
        Ok(())
    }

    async fn get(&self, key: &ObjectKey) -> Result<Option<Bytes>, StoreError> {
        Ok(self.blocks.get(&key.to_key_string()).map(|b| b.clone()))
    }

    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError> {
        self.blocks.remove(&key.to_key_string());
        Ok(())
    }
}
