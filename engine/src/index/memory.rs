//! In-memory reference implementations of the index repositories
//!
//! Backed by `dashmap` so contention is scoped to records sharing a key, the
//! same granularity a key-value index store provides. Used by tests and
//! single-node deployments; a DynamoDB-shaped backend implements the same
//! traits.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::BTreeSet;

use super::repository::{IdIndexRepository, S3IndexRepository};
use super::types::{IdKey, IndexError, LookupKey, ObjectKey, S3IndexEntry};
use crate::cuboid::MortonId;

/// Forward table held in process memory
#[derive(Default)]
pub struct InMemoryS3Index {
    entries: DashMap<ObjectKey, S3IndexEntry>,
}

impl InMemoryS3Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed blocks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl S3IndexRepository for InMemoryS3Index {
    async fn upsert(&self, entry: S3IndexEntry) -> Result<(), IndexError> {
        match self.entries.entry(entry.object_key) {
            Entry::Occupied(mut existing) => {
                // Later writers only contribute ids; provenance stays
                existing.get_mut().id_set.extend(entry.id_set);
            }
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
        }
        Ok(())
    }

    async fn get(&self, key: &ObjectKey) -> Result<Option<S3IndexEntry>, IndexError> {
        Ok(self.entries.get(key).map(|e| e.clone()))
    }

    async fn delete(&self, key: &ObjectKey) -> Result<(), IndexError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn scan_lookup(&self, lookup: &LookupKey) -> Result<Vec<S3IndexEntry>, IndexError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.object_key.lookup == *lookup)
            .map(|e| e.clone())
            .collect())
    }

    async fn scan_ingest_job(
        &self,
        lookup: &LookupKey,
        job_hash: &str,
    ) -> Result<Vec<S3IndexEntry>, IndexError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.object_key.lookup == *lookup && e.job.hash == job_hash)
            .map(|e| e.clone())
            .collect())
    }
}

/// Reverse table held in process memory
#[derive(Default)]
pub struct InMemoryIdIndex {
    records: DashMap<IdKey, BTreeSet<MortonId>>,
}

impl InMemoryIdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ids with at least one block
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl IdIndexRepository for InMemoryIdIndex {
    async fn add_cuboid(&self, key: &IdKey, morton: MortonId) -> Result<(), IndexError> {
        self.records.entry(*key).or_default().insert(morton);
        Ok(())
    }

    async fn remove_cuboid(&self, key: &IdKey, morton: MortonId) -> Result<(), IndexError> {
        if let Some(mut set) = self.records.get_mut(key) {
            set.remove(&morton);
        }
        // Backends cannot hold an empty set attribute either
        self.records.remove_if(key, |_, set| set.is_empty());
        Ok(())
    }

    async fn cuboid_set(&self, key: &IdKey) -> Result<BTreeSet<MortonId>, IndexError> {
        Ok(self.records.get(key).map(|s| s.clone()).unwrap_or_default())
    }
}
