//! Block store error definitions

use thiserror::Error;

/// Errors surfaced by block store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Block not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
