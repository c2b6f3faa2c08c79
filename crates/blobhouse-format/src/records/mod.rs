//! Binary Record Formats
//!
//! This module implements the versioned, CRC-checked binary records that
//! make up a blobhouse log segment. Every record follows the same shell:
//!
//! ```text
//! ┌──────────────┬──────────────────────────┬──────────────┐
//! │ Version      │ Type-specific payload    │ CRC-32       │
//! │ (2 bytes)    │ (fixed field order)      │ (8 bytes)    │
//! └──────────────┴──────────────────────────┴──────────────┘
//! ```
//!
//! - The version tag leads every record (not just the file), so
//!   mixed-version records can coexist across compaction epochs without a
//!   global format migration.
//! - The CRC-32 trailer covers every byte of the record preceding it,
//!   version tag included, widened to 8 bytes on the wire.
//! - All multi-byte integers are big-endian, matching the byte order of the
//!   existing on-disk data.
//!
//! ## Record Kinds
//!
//! | Record            | Module             | Layout after version tag        |
//! |-------------------|--------------------|---------------------------------|
//! | MessageHeader V1  | [`header`]         | size u64, 4 × relative offset i32 |
//! | BlobProperties V1 | [`properties`]     | ttl i64, private u8, created u64, size u64, 3 × nullable string |
//! | Delete V1         | [`delete`]         | deleted u8                      |
//! | UserMetadata V1   | [`user_metadata`]  | size u32, bytes                 |
//! | Blob V1           | [`blob`]           | size u64, bytes                 |
//! | Blob V2           | [`blob`]           | blob type u16, size u64, bytes  |
//! | MetadataContent V1| [`metadata_content`] | key size u32, key count u32, keys |
//!
//! Decoding reads fields in the same fixed order through a
//! [`CrcReader`](crate::crc::CrcReader) so that corruption anywhere in the
//! record is detected as soon as the checksum region is consumed. A stream
//! that ends early yields [`Error::Truncated`](crate::Error::Truncated); a
//! version tag we do not recognize yields
//! [`Error::UnknownVersion`](crate::Error::UnknownVersion) before any other
//! field is read.

pub mod blob;
pub mod delete;
pub mod header;
pub mod metadata_content;
pub mod properties;
pub mod user_metadata;

use std::io::Read;

use crate::crc::CrcReader;
use crate::error::{Error, Result};

/// Read exactly `buf.len()` bytes, mapping a short read to `Truncated`.
pub(crate) fn read_exact<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<()> {
    r.read_exact(buf).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => Error::Truncated,
        _ => Error::Io(e),
    })
}

pub(crate) fn read_u8<R: Read>(r: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    read_exact(r, &mut buf)?;
    Ok(buf[0])
}

pub(crate) fn read_u16<R: Read>(r: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    read_exact(r, &mut buf)?;
    Ok(u16::from_be_bytes(buf))
}

pub(crate) fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_exact(r, &mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

pub(crate) fn read_i32<R: Read>(r: &mut R) -> Result<i32> {
    let mut buf = [0u8; 4];
    read_exact(r, &mut buf)?;
    Ok(i32::from_be_bytes(buf))
}

pub(crate) fn read_u64<R: Read>(r: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    read_exact(r, &mut buf)?;
    Ok(u64::from_be_bytes(buf))
}

pub(crate) fn read_i64<R: Read>(r: &mut R) -> Result<i64> {
    let mut buf = [0u8; 8];
    read_exact(r, &mut buf)?;
    Ok(i64::from_be_bytes(buf))
}

/// Read `len` bytes through `Read::take` so that a corrupt length field
/// cannot force a huge up-front allocation. A short read is `Truncated`.
pub(crate) fn read_bytes<R: Read>(r: &mut R, len: u64) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    r.take(len).read_to_end(&mut data)?;
    if data.len() as u64 != len {
        return Err(Error::Truncated);
    }
    Ok(data)
}

/// Consume the 8-byte checksum trailer and compare it against the CRC
/// accumulated over the record body. The trailer is read through the
/// underlying reader so it does not feed the hasher.
pub(crate) fn check_crc<R: Read>(reader: &mut CrcReader<R>) -> Result<()> {
    let computed = reader.value();
    let stored = read_u64(reader.get_mut())?;
    if stored != computed as u64 {
        return Err(Error::Corrupt(format!(
            "crc mismatch: stored {stored:#010x}, computed {computed:#010x}"
        )));
    }
    Ok(())
}
