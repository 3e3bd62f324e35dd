//! Index key and record types
//!
//! The annotation index is two denormalized key-value tables: the S3 index
//! (block -> ids it contains) and the id index (id -> blocks containing it).
//! Keys follow the `hash&collection&experiment&channel&resolution&...` layout
//! of the original store, with a digest prefix so keys spread evenly across
//! backend partitions.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::cuboid::MortonId;

/// Reserved numeric range key; always the lowest/only value in this engine
pub const VERSION_NODE: u64 = 0;

/// Lookup attributes are spread over this many partition suffixes to avoid
/// hot keys during ingest. May be increased later, never decreased without
/// rewriting every stored entry.
pub const LOOKUP_KEY_MAX_N: u8 = 100;

/// Partition spread for the ingest-job attribute, used by bulk deletion
pub const INGEST_ID_MAX_N: u8 = 100;

/// Errors raised by index repositories and the annotation index
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Index backend error: {0}")]
    Backend(String),
}

/// `(collection, experiment, channel, resolution)` secondary projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupKey {
    pub collection: u32,
    pub experiment: u32,
    pub channel: u32,
    pub resolution: u32,
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}&{}&{}&{}",
            self.collection, self.experiment, self.channel, self.resolution
        )
    }
}

/// Identity of a physical cuboid in the block store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectKey {
    pub lookup: LookupKey,
    pub time_sample: u32,
    pub morton: MortonId,
}

impl ObjectKey {
    pub fn new(lookup: LookupKey, time_sample: u32, morton: MortonId) -> Self {
        Self {
            lookup,
            time_sample,
            morton,
        }
    }

    /// Render as `hash&collection&experiment&channel&resolution&time&morton`.
    ///
    /// The digest prefix keeps lexicographically adjacent blocks on different
    /// backend partitions.
    pub fn to_key_string(&self) -> String {
        let base = format!("{}&{}&{}", self.lookup, self.time_sample, self.morton);
        let digest = Sha256::digest(base.as_bytes());
        // 128 bits of prefix is plenty for partition spread
        let prefix: String = digest[..16].iter().map(|b| format!("{b:02x}")).collect();
        format!("{prefix}&{base}")
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_key_string())
    }
}

/// Key of a single id's reverse-index record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdKey {
    pub lookup: LookupKey,
    pub id: u64,
}

impl fmt::Display for IdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}&{}", self.lookup, self.id)
    }
}

/// Opaque provenance of the ingest job that wrote a block.
///
/// Threaded through from the ingest pipeline; only ever used as a bulk
/// deletion key, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IngestJob {
    pub hash: String,
    pub range: String,
}

/// Forward-index record: everything known about one stored block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3IndexEntry {
    pub object_key: ObjectKey,
    /// Reserved numeric range key, always [`VERSION_NODE`]
    pub version: u64,
    /// Annotation ids present in the block; empty for non-annotation channels
    pub id_set: BTreeSet<u64>,
    pub job: IngestJob,
    /// Suffix in `0..LOOKUP_KEY_MAX_N` for the lookup-key projection
    pub lookup_partition: u8,
    /// Suffix in `0..INGEST_ID_MAX_N` for the ingest-job projection
    pub ingest_partition: u8,
}

impl S3IndexEntry {
    /// Build an entry with freshly drawn partition suffixes
    pub fn new(object_key: ObjectKey, id_set: BTreeSet<u64>, job: IngestJob) -> Self {
        let mut rng = rand::rng();
        Self {
            object_key,
            version: VERSION_NODE,
            id_set,
            job,
            lookup_partition: rng.random_range(0..LOOKUP_KEY_MAX_N),
            ingest_partition: rng.random_range(0..INGEST_ID_MAX_N),
        }
    }

    /// Stored lookup-key attribute, e.g. `1&2&3&0#17`
    pub fn lookup_attribute(&self) -> String {
        format!("{}#{}", self.object_key.lookup, self.lookup_partition)
    }

    /// Stored ingest-job attribute, e.g. `1&2&3&0&jobhash#4`
    pub fn ingest_attribute(&self) -> String {
        format!(
            "{}&{}#{}",
            self.object_key.lookup, self.job.hash, self.ingest_partition
        )
    }
}
