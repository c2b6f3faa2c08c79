//! Error Types for the Record Codec
//!
//! Every decode failure falls into one of three categories, and callers are
//! expected to branch on them:
//!
//! - `UnknownVersion`: the record's leading version tag is not one we
//!   support. Signals an incompatible (likely newer) record. Never retried.
//! - `Corrupt`: the trailing CRC did not match, or the message header failed
//!   its internal offset cross-check. The store layer decides whether to
//!   skip the message, quarantine the segment, or abort the read.
//! - `Truncated`: the stream ended before all fields and the checksum were
//!   consumed. Distinguished from `Corrupt` because it indicates an
//!   incomplete write (crash mid-append) rather than bit rot; trailing
//!   truncation at the end of a segment is often expected.
//!
//! The codec itself never retries; retry policy belongs to the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unrecognized record version: {0}")]
    UnknownVersion(u16),

    #[error("record corrupt: {0}")]
    Corrupt(String),

    #[error("record truncated before checksum")]
    Truncated,

    #[error("invalid chunk key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
