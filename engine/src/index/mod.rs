//! Sparse annotation index
//!
//! This module provides:
//! - `AnnotationIndex` façade enforcing the cross-table ordering contract
//! - `S3IndexRepository` / `IdIndexRepository` traits for the two tables
//! - In-memory repository implementations for tests and single-node use
//! - Key and record types shared with the block store

mod annotation;
mod memory;
mod repository;
mod types;

pub use annotation::AnnotationIndex;
pub use memory::{InMemoryIdIndex, InMemoryS3Index};
pub use repository::{IdIndexRepository, S3IndexRepository};
pub use types::{
    INGEST_ID_MAX_N, IdKey, IndexError, IngestJob, LOOKUP_KEY_MAX_N, LookupKey, ObjectKey,
    S3IndexEntry, VERSION_NODE,
};
