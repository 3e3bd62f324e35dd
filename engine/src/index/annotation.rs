//! Annotation index façade
//!
//! Owns both index repositories and is the single place that enforces the
//! write-ordering contract between them:
//!
//! - `upsert_block` writes the forward (S3) entry before the reverse (id)
//!   entries, so a reader that observes a reverse entry can always resolve the
//!   forward record. A forward entry briefly visible without all its reverse
//!   entries is a tolerated, self-healing state repaired by `reconcile`.
//! - `remove_block` removes reverse entries first and deletes the forward
//!   entry last, so no reverse entry ever outlives its forward counterpart.
//!
//! Abandoned ingest jobs are not rolled back; their partial writes are swept
//! later by `purge_ingest_job` keyed on the job's provenance.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::memory::{InMemoryIdIndex, InMemoryS3Index};
use super::repository::{IdIndexRepository, S3IndexRepository};
use super::types::{IdKey, IndexError, IngestJob, LookupKey, ObjectKey, S3IndexEntry};
use crate::cuboid::MortonId;

/// Eventually-consistent bidirectional index over stored annotation cuboids
pub struct AnnotationIndex {
    s3: Arc<dyn S3IndexRepository>,
    ids: Arc<dyn IdIndexRepository>,
}

impl AnnotationIndex {
    pub fn new(s3: Arc<dyn S3IndexRepository>, ids: Arc<dyn IdIndexRepository>) -> Self {
        Self { s3, ids }
    }

    /// Both tables on in-process storage, for tests and single-node use
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryS3Index::new()),
            Arc::new(InMemoryIdIndex::new()),
        )
    }

    /// Record that a block contains `id_set`, updating both tables.
    ///
    /// Background (`0`) ids are never indexed. Concurrent upserts for the same
    /// block or id compose as set-union.
    pub async fn upsert_block(
        &self,
        key: ObjectKey,
        id_set: BTreeSet<u64>,
        job: IngestJob,
    ) -> Result<(), IndexError> {
        let id_set: BTreeSet<u64> = id_set.into_iter().filter(|id| *id != 0).collect();
        debug!(key = %key, ids = id_set.len(), "indexing block");

        // Forward entry first; reverse entries may trail and are repairable
        let entry = S3IndexEntry::new(key, id_set.clone(), job);
        self.s3.upsert(entry).await?;

        for id in id_set {
            let id_key = IdKey {
                lookup: key.lookup,
                id,
            };
            self.ids.add_cuboid(&id_key, key.morton).await?;
        }
        Ok(())
    }

    /// Drop a block from both tables, reverse entries first
    pub async fn remove_block(&self, key: &ObjectKey) -> Result<(), IndexError> {
        let Some(entry) = self.s3.get(key).await? else {
            warn!(key = %key, "remove_block: block not indexed");
            return Ok(());
        };

        for id in &entry.id_set {
            let id_key = IdKey {
                lookup: key.lookup,
                id: *id,
            };
            self.ids.remove_cuboid(&id_key, key.morton).await?;
        }

        self.s3.delete(key).await?;
        debug!(key = %key, "block removed from index");
        Ok(())
    }

    /// Morton ids of every block containing `id` at this lookup key
    pub async fn blocks_for_id(
        &self,
        lookup: LookupKey,
        id: u64,
    ) -> Result<BTreeSet<MortonId>, IndexError> {
        self.ids.cuboid_set(&IdKey { lookup, id }).await
    }

    /// All annotation ids present anywhere in this channel/resolution.
    ///
    /// This answers "which ids exist here", not "which blocks exist here";
    /// block enumeration goes through [`S3IndexRepository::scan_lookup`].
    pub async fn ids_in_range(&self, lookup: &LookupKey) -> Result<BTreeSet<u64>, IndexError> {
        let mut ids = BTreeSet::new();
        for entry in self.s3.scan_lookup(lookup).await? {
            ids.extend(entry.id_set.iter().copied());
        }
        Ok(ids)
    }

    /// Repair reverse entries missing for forward-indexed blocks.
    ///
    /// Idempotent; repeated passes converge with no side effects beyond
    /// restoring the invariant. Returns the number of memberships re-added.
    pub async fn reconcile(&self, lookup: &LookupKey) -> Result<usize, IndexError> {
        let mut repaired = 0;
        for entry in self.s3.scan_lookup(lookup).await? {
            let morton = entry.object_key.morton;
            for id in &entry.id_set {
                let id_key = IdKey {
                    lookup: *lookup,
                    id: *id,
                };
                if !self.ids.cuboid_set(&id_key).await?.contains(&morton) {
                    self.ids.add_cuboid(&id_key, morton).await?;
                    repaired += 1;
                }
            }
        }
        if repaired > 0 {
            info!(lookup = %lookup, repaired, "reconciled id index");
        }
        Ok(repaired)
    }

    /// Remove every block a given ingest job wrote under this lookup key.
    ///
    /// This is the cleanup path for abandoned jobs; returns the number of
    /// blocks removed.
    pub async fn purge_ingest_job(
        &self,
        lookup: &LookupKey,
        job_hash: &str,
    ) -> Result<usize, IndexError> {
        let entries = self.s3.scan_ingest_job(lookup, job_hash).await?;
        let count = entries.len();
        for entry in entries {
            self.remove_block(&entry.object_key).await?;
        }
        info!(lookup = %lookup, job_hash, removed = count, "purged ingest job");
        Ok(count)
    }

    /// Remove every block of a channel/resolution, both tables.
    ///
    /// Used when the owning channel or resolution level is deleted.
    pub async fn purge_channel(&self, lookup: &LookupKey) -> Result<usize, IndexError> {
        let entries = self.s3.scan_lookup(lookup).await?;
        let count = entries.len();
        for entry in entries {
            self.remove_block(&entry.object_key).await?;
        }
        info!(lookup = %lookup, removed = count, "purged channel from index");
        Ok(count)
    }
}
