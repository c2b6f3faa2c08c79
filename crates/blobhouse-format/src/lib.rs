//! # blobhouse-format
//!
//! The on-disk message record format for blobhouse: every blob persisted to
//! a log segment is written as a sequence of versioned, CRC-checked binary
//! records defined here. This crate is a leaf: it knows nothing about files,
//! stores, or the network. It serializes into `bytes::BytesMut` buffers and
//! deserializes from any `std::io::Read` stream.
//!
//! ## Layout of a Log Segment
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │ Message 1: Header │ Properties │ UserMetadata │ Blob      │
//! ├───────────────────────────────────────────────────────────┤
//! │ Message 2: Header │ Delete record                         │
//! ├───────────────────────────────────────────────────────────┤
//! │ ...                                                       │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Segments are append-only. Records are never mutated in place; a blob is
//! superseded by later records (a delete message) or removed wholesale when
//! the store compacts the segment.
//!
//! ## Guarantees
//!
//! - **Corruption fails closed**: every record ends in a CRC-32 trailer
//!   covering all preceding bytes of that record. Decoding streams fields
//!   through a checksum-accumulating reader and compares at the trailer;
//!   no partially-valid data is ever returned.
//! - **Versioned records**: every record leads with a 2-byte version tag.
//!   Unknown versions fail with a format error, never silently.
//! - **Failure taxonomy**: each decode failure is exactly one of
//!   unknown-version, corrupt, or truncated — see [`Error`]. The codec
//!   never retries; that is the store's call.
//!
//! ## Usage
//!
//! ```ignore
//! use blobhouse_format::{message, BlobProperties, BlobType};
//! use bytes::BytesMut;
//!
//! let props = BlobProperties { blob_size: 5, /* ... */ };
//! let mut buf = BytesMut::new();
//! message::serialize_put_message(&mut buf, &props, b"user-meta", BlobType::Data, b"hello");
//!
//! // later, reading the segment back:
//! let msg = message::read_message(&mut segment_stream)?;
//! ```

pub mod crc;
pub mod error;
pub mod message;
pub mod records;

pub use crc::{CrcReader, CrcWriter, CRC_SIZE, VERSION_FIELD_SIZE};
pub use error::{Error, Result};
pub use message::Message;
pub use records::blob::{BlobContent, BlobType};
pub use records::header::MessageHeader;
pub use records::properties::{BlobProperties, INFINITE_TTL_SECS};
