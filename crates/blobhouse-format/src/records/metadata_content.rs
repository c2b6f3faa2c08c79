//! Metadata Content Record
//!
//! When a logical blob is too large for one physical blob it is split into
//! chunks, each stored as its own blob. The parent "metadata blob" then
//! carries this record as its content: an ordered list of fixed-width chunk
//! keys, one per child blob.
//!
//! ```text
//! ┌─────────┬──────────┬───────────┬──────────────────────┬─────────┐
//! │ Version │ Key Size │ Key Count │ Count × fixed-width  │ CRC     │
//! │ (2)     │ (4)      │ (4)       │ keys (Key Size each) │ (8)     │
//! └─────────┴──────────┴───────────┴──────────────────────┴─────────┘
//! ```
//!
//! Keys are UTF-8 strings of exactly `key_size` bytes. Decode reproduces
//! the key list in its original order, which is the chunk order of the
//! logical blob. The encoded size is a pure function of key size and key
//! count so callers composing a carrier blob record can pre-size buffers.

use std::io::Read;

use bytes::BytesMut;

use crate::crc::{CrcReader, CrcWriter, CRC_SIZE, VERSION_FIELD_SIZE};
use crate::error::{Error, Result};
use crate::records::{check_crc, read_bytes, read_u16, read_u32};

pub const METADATA_CONTENT_VERSION_V1: u16 = 1;

/// Exact encoded size of a metadata content record carrying `key_count`
/// keys of `key_size` bytes each.
pub fn record_size(key_size: usize, key_count: usize) -> usize {
    VERSION_FIELD_SIZE + 4 + 4 + key_size * key_count + CRC_SIZE
}

/// Serialize the ordered chunk key list. Every key must be exactly
/// `key_size` bytes.
pub fn serialize(buf: &mut BytesMut, key_size: usize, keys: &[String]) -> Result<()> {
    for key in keys {
        if key.len() != key_size {
            return Err(Error::InvalidKeyLength {
                expected: key_size,
                actual: key.len(),
            });
        }
    }
    let mut w = CrcWriter::new(buf);
    w.put_u16(METADATA_CONTENT_VERSION_V1);
    w.put_u32(key_size as u32);
    w.put_u32(keys.len() as u32);
    for key in keys {
        w.put_slice(key.as_bytes());
    }
    w.finish();
    Ok(())
}

/// Decode the chunk key list, preserving order.
pub fn deserialize<R: Read>(r: &mut R) -> Result<Vec<String>> {
    let mut reader = CrcReader::new(r);
    let version = read_u16(&mut reader)?;
    if version != METADATA_CONTENT_VERSION_V1 {
        return Err(Error::UnknownVersion(version));
    }
    let key_size = read_u32(&mut reader)?;
    let key_count = read_u32(&mut reader)?;
    let mut keys = Vec::with_capacity(key_count.min(1024) as usize);
    for _ in 0..key_count {
        let bytes = read_bytes(&mut reader, key_size as u64)?;
        let key = String::from_utf8(bytes)
            .map_err(|_| Error::Corrupt("chunk key is not valid utf-8".to_string()))?;
        keys.push(key);
    }
    check_crc(&mut reader)?;
    Ok(keys)
}
