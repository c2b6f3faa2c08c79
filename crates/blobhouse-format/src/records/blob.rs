//! Blob Content Record
//!
//! The record that carries a blob's actual bytes. Two versions live
//! side-by-side in the log:
//!
//! ```text
//! V1:
//! ┌─────────┬─────────┬──────────┬─────────┐
//! │ Version │ Size    │ Data     │ CRC     │
//! │ (2)     │ (8)     │ (N)      │ (8)     │
//! └─────────┴─────────┴──────────┴─────────┘
//!
//! V2:
//! ┌─────────┬───────────┬─────────┬──────────┬─────────┐
//! │ Version │ Blob Type │ Size    │ Data     │ CRC     │
//! │ (2)     │ (2)       │ (8)     │ (N)      │ (8)     │
//! └─────────┴───────────┴─────────┴──────────┴─────────┘
//! ```
//!
//! V2 adds a [`BlobType`] discriminator immediately after the version tag
//! and before the length field, so a metadata blob's content (a
//! [`metadata_content`](crate::records::metadata_content) record listing
//! child-chunk keys) can be told apart from a plain data blob without
//! attempting to interpret raw bytes as metadata. V1 records decode as
//! [`BlobType::Data`].

use std::io::Read;

use bytes::{Bytes, BytesMut};

use crate::crc::{CrcReader, CrcWriter, CRC_SIZE, VERSION_FIELD_SIZE};
use crate::error::{Error, Result};
use crate::records::{check_crc, read_bytes, read_u16, read_u64};

pub const BLOB_VERSION_V1: u16 = 1;
pub const BLOB_VERSION_V2: u16 = 2;

/// Discriminator between plain data blobs and metadata blobs, carried by
/// V2 blob records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum BlobType {
    /// Plain data blob: the bytes are the blob content itself.
    Data = 0,
    /// Metadata blob: the bytes are a metadata content record listing the
    /// keys of child chunk blobs.
    Metadata = 1,
}

impl TryFrom<u16> for BlobType {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            0 => Ok(BlobType::Data),
            1 => Ok(BlobType::Metadata),
            _ => Err(Error::Corrupt(format!("unknown blob type: {value}"))),
        }
    }
}

/// A decoded blob content record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobContent {
    pub blob_type: BlobType,
    pub data: Bytes,
}

/// Exact encoded size of a V1 blob record holding `len` bytes of content.
pub fn record_size_v1(len: usize) -> usize {
    VERSION_FIELD_SIZE + 8 + len + CRC_SIZE
}

/// Exact encoded size of a V2 blob record holding `len` bytes of content.
pub fn record_size_v2(len: usize) -> usize {
    VERSION_FIELD_SIZE + 2 + 8 + len + CRC_SIZE
}

pub fn serialize_v1(buf: &mut BytesMut, data: &[u8]) {
    let mut w = CrcWriter::new(buf);
    w.put_u16(BLOB_VERSION_V1);
    w.put_u64(data.len() as u64);
    w.put_slice(data);
    w.finish();
}

pub fn serialize_v2(buf: &mut BytesMut, blob_type: BlobType, data: &[u8]) {
    let mut w = CrcWriter::new(buf);
    w.put_u16(BLOB_VERSION_V2);
    w.put_u16(blob_type as u16);
    w.put_u64(data.len() as u64);
    w.put_slice(data);
    w.finish();
}

/// Decode a blob record of either version. The version tag is read first
/// and dispatches the layout; an unrecognized version is a format error.
pub fn deserialize<R: Read>(r: &mut R) -> Result<BlobContent> {
    let mut reader = CrcReader::new(r);
    let version = read_u16(&mut reader)?;
    let blob_type = match version {
        BLOB_VERSION_V1 => BlobType::Data,
        BLOB_VERSION_V2 => BlobType::try_from(read_u16(&mut reader)?)?,
        v => return Err(Error::UnknownVersion(v)),
    };
    let size = read_u64(&mut reader)?;
    let data = read_bytes(&mut reader, size)?;
    check_crc(&mut reader)?;
    Ok(BlobContent {
        blob_type,
        data: Bytes::from(data),
    })
}
