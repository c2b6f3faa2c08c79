//! User Metadata Record
//!
//! An opaque, caller-supplied byte blob of variable length. The codec never
//! interprets the contents; it only frames and checksums them.
//!
//! ```text
//! ┌─────────┬─────────┬──────────┬─────────┐
//! │ Version │ Size    │ Bytes    │ CRC     │
//! │ (2)     │ (4)     │ (N)      │ (8)     │
//! └─────────┴─────────┴──────────┴─────────┘
//! ```

use std::io::Read;

use bytes::{Bytes, BytesMut};

use crate::crc::{CrcReader, CrcWriter, CRC_SIZE, VERSION_FIELD_SIZE};
use crate::error::{Error, Result};
use crate::records::{check_crc, read_bytes, read_u16, read_u32};

pub const USER_METADATA_VERSION_V1: u16 = 1;

/// Exact encoded size of a user metadata record holding `len` bytes.
pub fn record_size(len: usize) -> usize {
    VERSION_FIELD_SIZE + 4 + len + CRC_SIZE
}

pub fn serialize(buf: &mut BytesMut, user_metadata: &[u8]) {
    let mut w = CrcWriter::new(buf);
    w.put_u16(USER_METADATA_VERSION_V1);
    w.put_u32(user_metadata.len() as u32);
    w.put_slice(user_metadata);
    w.finish();
}

pub fn deserialize<R: Read>(r: &mut R) -> Result<Bytes> {
    let mut reader = CrcReader::new(r);
    let version = read_u16(&mut reader)?;
    if version != USER_METADATA_VERSION_V1 {
        return Err(Error::UnknownVersion(version));
    }
    let size = read_u32(&mut reader)?;
    let data = read_bytes(&mut reader, size as u64)?;
    check_crc(&mut reader)?;
    Ok(Bytes::from(data))
}
