//! Repository traits for the two index tables
//!
//! The forward (S3) and reverse (id) tables live in separate physical stores
//! with no cross-table transaction. All set-shaped mutations are union /
//! difference operations so that concurrent writers touching the same record
//! compose commutatively and idempotently.

use async_trait::async_trait;
use std::collections::BTreeSet;

use super::types::{IdKey, IndexError, LookupKey, ObjectKey, S3IndexEntry};
use crate::cuboid::MortonId;

/// Forward table: block -> ids it contains, plus provenance
#[async_trait]
pub trait S3IndexRepository: Send + Sync {
    /// Insert the entry, or union its `id_set` into an existing record.
    ///
    /// The first writer's provenance and partition suffixes are kept; later
    /// writers only contribute ids.
    async fn upsert(&self, entry: S3IndexEntry) -> Result<(), IndexError>;

    async fn get(&self, key: &ObjectKey) -> Result<Option<S3IndexEntry>, IndexError>;

    async fn delete(&self, key: &ObjectKey) -> Result<(), IndexError>;

    /// All entries whose lookup projection matches, across every partition
    /// suffix
    async fn scan_lookup(&self, lookup: &LookupKey) -> Result<Vec<S3IndexEntry>, IndexError>;

    /// All entries written by the given ingest job under this lookup key
    async fn scan_ingest_job(
        &self,
        lookup: &LookupKey,
        job_hash: &str,
    ) -> Result<Vec<S3IndexEntry>, IndexError>;
}

/// Reverse table: id -> Morton ids of blocks containing it
#[async_trait]
pub trait IdIndexRepository: Send + Sync {
    /// Add a block to the id's cuboid set (set-union, creates the record)
    async fn add_cuboid(&self, key: &IdKey, morton: MortonId) -> Result<(), IndexError>;

    /// Remove a block from the id's cuboid set; empty records are dropped
    async fn remove_cuboid(&self, key: &IdKey, morton: MortonId) -> Result<(), IndexError>;

    /// Current cuboid set for an id; empty when the id is unknown
    async fn cuboid_set(&self, key: &IdKey) -> Result<BTreeSet<MortonId>, IndexError>;
}
