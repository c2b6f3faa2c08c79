//! Blob Properties Record
//!
//! System-level properties persisted alongside every blob: its size, who
//! wrote it, its content type, whether it is private, when it was created,
//! and how long it lives.
//!
//! ```text
//! ┌─────────┬─────────┬─────────┬──────────┬───────────┬───────────────────┬─────────┐
//! │ Version │ TTL     │ Private │ Created  │ Blob Size │ 3 × nullable str  │ CRC     │
//! │ (2)     │ (8)     │ (1)     │ (8)      │ (8)       │ (4 + len each)    │ (8)     │
//! └─────────┴─────────┴─────────┴──────────┴───────────┴───────────────────┴─────────┘
//! ```
//!
//! Nullable strings (content type, owner id, service id, in that order) are
//! written as a 4-byte signed length followed by UTF-8 bytes; `-1` means
//! absent. TTL is in seconds with `-1` meaning the blob never expires.

use std::io::Read;

use bytes::BytesMut;
use serde::{Deserialize, Serialize};

use crate::crc::{CrcReader, CrcWriter, CRC_SIZE, VERSION_FIELD_SIZE};
use crate::error::{Error, Result};
use crate::records::{check_crc, read_bytes, read_i32, read_i64, read_u16, read_u64, read_u8};

pub const BLOB_PROPERTIES_VERSION_V1: u16 = 1;

/// TTL value meaning the blob never expires.
pub const INFINITE_TTL_SECS: i64 = -1;

/// Properties of a stored blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobProperties {
    /// Size of the blob content in bytes.
    pub blob_size: u64,

    /// Id of the service that uploaded the blob.
    pub service_id: Option<String>,

    /// Id of the owner on whose behalf the blob was uploaded.
    pub owner_id: Option<String>,

    /// MIME content type, as supplied by the caller.
    pub content_type: Option<String>,

    /// Whether the blob is marked private.
    pub is_private: bool,

    /// Time to live in seconds; [`INFINITE_TTL_SECS`] means never expires.
    pub ttl_secs: i64,

    /// Creation timestamp, milliseconds since epoch.
    pub creation_time_ms: u64,
}

impl BlobProperties {
    /// Exact encoded size of this record, version tag and CRC included.
    pub fn record_size(&self) -> usize {
        VERSION_FIELD_SIZE
            + 8 // ttl
            + 1 // private flag
            + 8 // creation time
            + 8 // blob size
            + nullable_string_size(self.content_type.as_deref())
            + nullable_string_size(self.owner_id.as_deref())
            + nullable_string_size(self.service_id.as_deref())
            + CRC_SIZE
    }

    pub fn serialize(&self, buf: &mut BytesMut) {
        let mut w = CrcWriter::new(buf);
        w.put_u16(BLOB_PROPERTIES_VERSION_V1);
        w.put_i64(self.ttl_secs);
        w.put_u8(self.is_private as u8);
        w.put_u64(self.creation_time_ms);
        w.put_u64(self.blob_size);
        put_nullable_string(&mut w, self.content_type.as_deref());
        put_nullable_string(&mut w, self.owner_id.as_deref());
        put_nullable_string(&mut w, self.service_id.as_deref());
        w.finish();
    }

    pub fn deserialize<R: Read>(r: &mut R) -> Result<Self> {
        let mut reader = CrcReader::new(r);
        let version = read_u16(&mut reader)?;
        if version != BLOB_PROPERTIES_VERSION_V1 {
            return Err(Error::UnknownVersion(version));
        }
        let ttl_secs = read_i64(&mut reader)?;
        let is_private = read_u8(&mut reader)? != 0;
        let creation_time_ms = read_u64(&mut reader)?;
        let blob_size = read_u64(&mut reader)?;
        let content_type = read_nullable_string(&mut reader)?;
        let owner_id = read_nullable_string(&mut reader)?;
        let service_id = read_nullable_string(&mut reader)?;
        check_crc(&mut reader)?;
        Ok(Self {
            blob_size,
            service_id,
            owner_id,
            content_type,
            is_private,
            ttl_secs,
            creation_time_ms,
        })
    }
}

fn nullable_string_size(s: Option<&str>) -> usize {
    4 + s.map(str::len).unwrap_or(0)
}

fn put_nullable_string(w: &mut CrcWriter<'_>, s: Option<&str>) {
    match s {
        Some(s) => {
            w.put_i32(s.len() as i32);
            w.put_slice(s.as_bytes());
        }
        None => w.put_i32(-1),
    }
}

fn read_nullable_string<R: Read>(r: &mut R) -> Result<Option<String>> {
    let len = read_i32(r)?;
    if len < 0 {
        return Ok(None);
    }
    let bytes = read_bytes(r, len as u64)?;
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|_| Error::Corrupt("string field is not valid utf-8".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> BlobProperties {
        BlobProperties {
            blob_size: 1234,
            service_id: Some("media-upload".to_string()),
            owner_id: Some("member-42".to_string()),
            content_type: Some("image/jpeg".to_string()),
            is_private: true,
            ttl_secs: 1234,
            creation_time_ms: 1_700_000_000_000,
        }
    }

    // Test 1: round trip preserves every field
    #[test]
    fn test_roundtrip() {
        let props = sample();
        let mut buf = BytesMut::new();
        props.serialize(&mut buf);
        assert_eq!(buf.len(), props.record_size());

        let decoded = BlobProperties::deserialize(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, props);
    }

    // Test 2: absent strings and infinite ttl round trip
    #[test]
    fn test_roundtrip_absent_fields() {
        let props = BlobProperties {
            blob_size: 0,
            service_id: None,
            owner_id: None,
            content_type: None,
            is_private: false,
            ttl_secs: INFINITE_TTL_SECS,
            creation_time_ms: 0,
        };
        let mut buf = BytesMut::new();
        props.serialize(&mut buf);
        assert_eq!(buf.len(), props.record_size());

        let decoded = BlobProperties::deserialize(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded, props);
    }

    // Test 3: flipping any byte before the checksum fails the decode
    #[test]
    fn test_corruption_detected_everywhere() {
        let props = sample();
        let mut clean = BytesMut::new();
        props.serialize(&mut clean);
        for i in VERSION_FIELD_SIZE..clean.len() - CRC_SIZE {
            let mut buf = clean.clone();
            buf[i] ^= 0x10;
            let result = BlobProperties::deserialize(&mut Cursor::new(&buf[..]));
            assert!(
                matches!(result, Err(Error::Corrupt(_)) | Err(Error::Truncated)),
                "byte {i} flip yielded {result:?}"
            );
        }
    }

    // Test 4: unknown version is a format error, not corruption
    #[test]
    fn test_unknown_version() {
        let mut buf = BytesMut::new();
        sample().serialize(&mut buf);
        buf[1] = 9;
        assert!(matches!(
            BlobProperties::deserialize(&mut Cursor::new(&buf[..])),
            Err(Error::UnknownVersion(9))
        ));
    }

    // Test 5: stream ending mid-record is truncation
    #[test]
    fn test_truncated() {
        let mut buf = BytesMut::new();
        sample().serialize(&mut buf);
        let cut = buf.len() - CRC_SIZE - 1;
        assert!(matches!(
            BlobProperties::deserialize(&mut Cursor::new(&buf[..cut])),
            Err(Error::Truncated)
        ));
    }
}
