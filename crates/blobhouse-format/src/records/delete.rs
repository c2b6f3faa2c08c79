//! Delete Marker Record
//!
//! Presence of this record logically tombstones a blob id. The payload is a
//! single flag; the record exists mostly so the tombstone itself is
//! versioned and checksummed like everything else in the log.
//!
//! ```text
//! ┌─────────┬─────────┬─────────┐
//! │ Version │ Deleted │ CRC     │
//! │ (2)     │ (1)     │ (8)     │
//! └─────────┴─────────┴─────────┘
//! ```

use std::io::Read;

use bytes::BytesMut;

use crate::crc::{CrcReader, CrcWriter, CRC_SIZE, VERSION_FIELD_SIZE};
use crate::error::{Error, Result};
use crate::records::{check_crc, read_u16, read_u8};

pub const DELETE_VERSION_V1: u16 = 1;

/// Encoded size of a V1 delete record: 11 bytes.
pub const DELETE_RECORD_SIZE: usize = VERSION_FIELD_SIZE + 1 + CRC_SIZE;

pub fn serialize(buf: &mut BytesMut, deleted: bool) {
    let mut w = CrcWriter::new(buf);
    w.put_u16(DELETE_VERSION_V1);
    w.put_u8(deleted as u8);
    w.finish();
}

pub fn deserialize<R: Read>(r: &mut R) -> Result<bool> {
    let mut reader = CrcReader::new(r);
    let version = read_u16(&mut reader)?;
    if version != DELETE_VERSION_V1 {
        return Err(Error::UnknownVersion(version));
    }
    let deleted = read_u8(&mut reader)? != 0;
    check_crc(&mut reader)?;
    Ok(deleted)
}
