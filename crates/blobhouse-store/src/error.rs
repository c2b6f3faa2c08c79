//! Store-Side Error Types
//!
//! Errors surfaced across the compaction scheduler's boundary with a
//! [`BlobStore`](crate::store::BlobStore). A store's resume or compact call
//! can fail for any reason — including codec-level corruption discovered
//! while rewriting a segment — and the scheduler treats every failure the
//! same way: log it, add the store to the skip-set, move on to the next
//! store. Nothing here ever crashes the scheduler thread.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store not started: {0}")]
    NotStarted(String),

    #[error("compaction failed for store {store}: {reason}")]
    CompactionFailed { store: String, reason: String },

    #[error("record format error: {0}")]
    Format(#[from] blobhouse_format::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
