//! Message Header Record
//!
//! A fixed-size index record written at the front of every message. It
//! carries the total size of the records that follow it and the relative
//! byte offsets (from the start of the message) of each sub-record. An
//! offset of `-1` on the wire means the sub-record is absent.
//!
//! ```text
//! ┌─────────┬──────────────┬────────────┬──────────┬──────────────┬──────────┬─────────┐
//! │ Version │ Message Size │ Properties │ Delete   │ UserMetadata │ Blob     │ CRC     │
//! │ (2)     │ (8)          │ Offset (4) │ Offset(4)│ Offset (4)   │ Offset(4)│ (8)     │
//! └─────────┴──────────────┴────────────┴──────────┴──────────────┴──────────┴─────────┘
//! ```
//!
//! A header is well-formed in exactly one of two shapes:
//! - **put-form**: properties, user metadata, and blob offsets present,
//!   delete offset absent;
//! - **delete-form**: delete offset present, all others absent.
//!
//! [`MessageHeader::verify`] enforces that shape plus offset ordering and
//! bounds. It is an internal consistency re-check separate from the CRC: a
//! header that survives its checksum but describes an impossible layout is
//! still rejected as corrupt.

use std::io::Read;

use bytes::BytesMut;

use crate::crc::{CrcReader, CrcWriter, CRC_SIZE, VERSION_FIELD_SIZE};
use crate::error::{Error, Result};
use crate::records::{check_crc, read_i32, read_u16, read_u64};

pub const MESSAGE_HEADER_VERSION_V1: u16 = 1;

/// Wire value for an absent relative offset.
const ABSENT_OFFSET: i32 = -1;

/// Number of relative offset fields in a V1 header.
const OFFSET_FIELD_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    /// Total size in bytes of the records following this header.
    pub message_size: u64,

    /// Offset of the blob properties record, relative to the message start.
    pub blob_properties_offset: Option<u32>,

    /// Offset of the delete record, relative to the message start.
    pub delete_offset: Option<u32>,

    /// Offset of the user metadata record, relative to the message start.
    pub user_metadata_offset: Option<u32>,

    /// Offset of the blob content record, relative to the message start.
    pub blob_offset: Option<u32>,
}

impl MessageHeader {
    /// Encoded size of a V1 header, checksum trailer included.
    pub const SIZE: usize = VERSION_FIELD_SIZE + 8 + OFFSET_FIELD_COUNT * 4 + CRC_SIZE;

    /// Header for a put message: properties, user metadata, and blob
    /// content laid out in that order immediately after the header.
    pub fn for_put(
        message_size: u64,
        blob_properties_offset: u32,
        user_metadata_offset: u32,
        blob_offset: u32,
    ) -> Self {
        Self {
            message_size,
            blob_properties_offset: Some(blob_properties_offset),
            delete_offset: None,
            user_metadata_offset: Some(user_metadata_offset),
            blob_offset: Some(blob_offset),
        }
    }

    /// Header for a delete message: a single delete record after the header.
    pub fn for_delete(message_size: u64, delete_offset: u32) -> Self {
        Self {
            message_size,
            blob_properties_offset: None,
            delete_offset: Some(delete_offset),
            user_metadata_offset: None,
            blob_offset: None,
        }
    }

    pub fn serialize(&self, buf: &mut BytesMut) {
        let mut w = CrcWriter::new(buf);
        w.put_u16(MESSAGE_HEADER_VERSION_V1);
        w.put_u64(self.message_size);
        w.put_i32(encode_offset(self.blob_properties_offset));
        w.put_i32(encode_offset(self.delete_offset));
        w.put_i32(encode_offset(self.user_metadata_offset));
        w.put_i32(encode_offset(self.blob_offset));
        w.finish();
    }

    /// Decode a header, verifying its CRC. Layout consistency is checked
    /// separately via [`MessageHeader::verify`].
    pub fn deserialize<R: Read>(r: &mut R) -> Result<Self> {
        let mut reader = CrcReader::new(r);
        let version = read_u16(&mut reader)?;
        if version != MESSAGE_HEADER_VERSION_V1 {
            return Err(Error::UnknownVersion(version));
        }
        let message_size = read_u64(&mut reader)?;
        let blob_properties_offset = decode_offset(read_i32(&mut reader)?);
        let delete_offset = decode_offset(read_i32(&mut reader)?);
        let user_metadata_offset = decode_offset(read_i32(&mut reader)?);
        let blob_offset = decode_offset(read_i32(&mut reader)?);
        check_crc(&mut reader)?;
        Ok(Self {
            message_size,
            blob_properties_offset,
            delete_offset,
            user_metadata_offset,
            blob_offset,
        })
    }

    /// Internal consistency re-check, separate from the CRC.
    ///
    /// Present offsets must describe either a put-form or a delete-form
    /// message, start immediately after the header, increase strictly, and
    /// stay inside the message bounds.
    pub fn verify(&self) -> Result<()> {
        if self.message_size == 0 {
            return Err(Error::Corrupt("header message size is zero".to_string()));
        }
        let end = Self::SIZE as u64 + self.message_size;
        match (
            self.blob_properties_offset,
            self.delete_offset,
            self.user_metadata_offset,
            self.blob_offset,
        ) {
            (Some(props), None, Some(meta), Some(blob)) => {
                if props as usize != Self::SIZE {
                    return Err(Error::Corrupt(format!(
                        "blob properties offset {props} does not follow the header"
                    )));
                }
                if !(props < meta && meta < blob) {
                    return Err(Error::Corrupt(format!(
                        "header offsets overlap or are out of order: {props}, {meta}, {blob}"
                    )));
                }
                if blob as u64 >= end {
                    return Err(Error::Corrupt(format!(
                        "blob offset {blob} lies outside message of {end} bytes"
                    )));
                }
                Ok(())
            }
            (None, Some(delete), None, None) => {
                if delete as usize != Self::SIZE {
                    return Err(Error::Corrupt(format!(
                        "delete record offset {delete} does not follow the header"
                    )));
                }
                Ok(())
            }
            _ => Err(Error::Corrupt(
                "header offsets form neither a put nor a delete message".to_string(),
            )),
        }
    }

    /// True when this header describes a delete message.
    pub fn is_delete(&self) -> bool {
        self.delete_offset.is_some()
    }
}

fn encode_offset(offset: Option<u32>) -> i32 {
    match offset {
        Some(v) => v as i32,
        None => ABSENT_OFFSET,
    }
}

fn decode_offset(raw: i32) -> Option<u32> {
    if raw < 0 {
        None
    } else {
        Some(raw as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn put_header() -> MessageHeader {
        // offsets as produced by a real composition: properties right after
        // the header, then 100 bytes of properties, then 50 of metadata
        MessageHeader::for_put(1000, MessageHeader::SIZE as u32, 134, 184)
    }

    // Test 1: round trip preserves all fields
    #[test]
    fn test_header_roundtrip() {
        let header = put_header();
        let mut buf = BytesMut::new();
        header.serialize(&mut buf);
        assert_eq!(buf.len(), MessageHeader::SIZE);

        let decoded = MessageHeader::deserialize(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, header);
        decoded.verify().unwrap();
    }

    // Test 2: delete-form round trip
    #[test]
    fn test_delete_header_roundtrip() {
        let header = MessageHeader::for_delete(11, MessageHeader::SIZE as u32);
        let mut buf = BytesMut::new();
        header.serialize(&mut buf);

        let decoded = MessageHeader::deserialize(&mut Cursor::new(&buf[..])).unwrap();
        assert!(decoded.is_delete());
        decoded.verify().unwrap();
    }

    // Test 3: flipping byte 10 (inside the offset fields) fails the CRC check
    #[test]
    fn test_corrupt_offset_field() {
        let mut buf = BytesMut::new();
        put_header().serialize(&mut buf);
        buf[10] ^= 0x01;
        match MessageHeader::deserialize(&mut Cursor::new(&buf[..])) {
            Err(Error::Corrupt(_)) => {}
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    // Test 4: every byte after the version tag is covered by the CRC
    #[test]
    fn test_corrupt_any_body_byte() {
        let mut clean = BytesMut::new();
        put_header().serialize(&mut clean);
        for i in VERSION_FIELD_SIZE..MessageHeader::SIZE - CRC_SIZE {
            let mut buf = clean.clone();
            buf[i] ^= 0xFF;
            assert!(
                matches!(
                    MessageHeader::deserialize(&mut Cursor::new(&buf[..])),
                    Err(Error::Corrupt(_))
                ),
                "byte {i} flip not detected"
            );
        }
    }

    // Test 5: unknown version is rejected before any field is trusted
    #[test]
    fn test_unknown_version() {
        let mut buf = BytesMut::new();
        put_header().serialize(&mut buf);
        buf[0] = 0x7F;
        buf[1] = 0x42;
        match MessageHeader::deserialize(&mut Cursor::new(&buf[..])) {
            Err(Error::UnknownVersion(v)) => assert_eq!(v, 0x7F42),
            other => panic!("expected UnknownVersion, got {other:?}"),
        }
    }

    // Test 6: truncated stream is reported as truncation, not corruption
    #[test]
    fn test_truncated_header() {
        let mut buf = BytesMut::new();
        put_header().serialize(&mut buf);
        for len in [0, 1, 5, MessageHeader::SIZE - 1] {
            match MessageHeader::deserialize(&mut Cursor::new(&buf[..len])) {
                Err(Error::Truncated) => {}
                other => panic!("expected Truncated at len {len}, got {other:?}"),
            }
        }
    }

    // Test 7: a crc-valid header with an impossible layout fails verify()
    #[test]
    fn test_verify_rejects_mixed_form() {
        let mut header = put_header();
        header.delete_offset = Some(MessageHeader::SIZE as u32);
        let mut buf = BytesMut::new();
        header.serialize(&mut buf);

        // crc is consistent with the serialized bytes, so decode succeeds
        let decoded = MessageHeader::deserialize(&mut Cursor::new(&buf[..])).unwrap();
        assert!(matches!(decoded.verify(), Err(Error::Corrupt(_))));
    }

    // Test 8: out-of-order offsets fail verify()
    #[test]
    fn test_verify_rejects_overlapping_offsets() {
        let header = MessageHeader::for_put(1000, MessageHeader::SIZE as u32, 200, 150);
        assert!(matches!(header.verify(), Err(Error::Corrupt(_))));
    }

    // Test 9: blob offset beyond the message bounds fails verify()
    #[test]
    fn test_verify_rejects_out_of_bounds_offset() {
        let header = MessageHeader::for_put(100, MessageHeader::SIZE as u32, 60, 5000);
        assert!(matches!(header.verify(), Err(Error::Corrupt(_))));
    }
}
