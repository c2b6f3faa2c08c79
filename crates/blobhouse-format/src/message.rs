//! Message Composition and Readback
//!
//! A message is the unit the store appends to a log segment: a
//! [`MessageHeader`] followed by the records the header's relative offsets
//! point at. Two shapes exist:
//!
//! ```text
//! Put message:
//! ┌────────────────┬─────────────────┬───────────────┬──────────────┐
//! │ MessageHeader  │ BlobProperties  │ UserMetadata  │ Blob (V2)    │
//! └────────────────┴─────────────────┴───────────────┴──────────────┘
//!
//! Delete message:
//! ┌────────────────┬────────────────┐
//! │ MessageHeader  │ Delete record  │
//! └────────────────┴────────────────┘
//! ```
//!
//! Records are append-only once written; a blob is superseded only by later
//! records (a delete message) or removed wholesale during compaction.
//!
//! Readback is streaming: the header is decoded and verified first, then
//! each sub-record is decoded in order, cross-checking the bytes consumed so
//! far against the header's offsets. A record whose actual size disagrees
//! with the next offset means the regions overlap, and the message is
//! rejected as corrupt even though each record's own CRC was intact.

use std::io::Read;

use bytes::{Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::records::blob::{self, BlobContent, BlobType};
use crate::records::header::MessageHeader;
use crate::records::properties::BlobProperties;
use crate::records::{delete, user_metadata};

/// A fully decoded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Put {
        properties: BlobProperties,
        user_metadata: Bytes,
        blob: BlobContent,
    },
    Delete {
        deleted: bool,
    },
}

/// Total encoded size of a put message for the given payload.
pub fn put_message_size(properties: &BlobProperties, user_metadata_len: usize, blob_len: usize) -> usize {
    MessageHeader::SIZE
        + properties.record_size()
        + user_metadata::record_size(user_metadata_len)
        + blob::record_size_v2(blob_len)
}

/// Total encoded size of a delete message.
pub fn delete_message_size() -> usize {
    MessageHeader::SIZE + delete::DELETE_RECORD_SIZE
}

/// Serialize a complete put message: header with computed offsets, then
/// properties, user metadata, and a V2 blob record.
pub fn serialize_put_message(
    buf: &mut BytesMut,
    properties: &BlobProperties,
    user_metadata_bytes: &[u8],
    blob_type: BlobType,
    blob_data: &[u8],
) {
    let props_offset = MessageHeader::SIZE;
    let meta_offset = props_offset + properties.record_size();
    let blob_offset = meta_offset + user_metadata::record_size(user_metadata_bytes.len());
    let message_size =
        (blob_offset + blob::record_size_v2(blob_data.len()) - MessageHeader::SIZE) as u64;

    let header = MessageHeader::for_put(
        message_size,
        props_offset as u32,
        meta_offset as u32,
        blob_offset as u32,
    );
    header.serialize(buf);
    properties.serialize(buf);
    user_metadata::serialize(buf, user_metadata_bytes);
    blob::serialize_v2(buf, blob_type, blob_data);
}

/// Serialize a complete delete message.
pub fn serialize_delete_message(buf: &mut BytesMut) {
    let header = MessageHeader::for_delete(
        delete::DELETE_RECORD_SIZE as u64,
        MessageHeader::SIZE as u32,
    );
    header.serialize(buf);
    delete::serialize(buf, true);
}

/// Decode one message from the stream.
///
/// The header is decoded and verified first; sub-records are then decoded
/// in offset order. Any disagreement between a decoded record's size and
/// the next header offset fails closed with `Corrupt`.
pub fn read_message<R: Read>(r: &mut R) -> Result<Message> {
    let header = MessageHeader::deserialize(r)?;
    header.verify()?;

    if header.is_delete() {
        let deleted = delete::deserialize(r)?;
        return Ok(Message::Delete { deleted });
    }

    // put-form; verify() guarantees all three offsets are present
    let meta_offset = header.user_metadata_offset.unwrap_or_default() as usize;
    let blob_offset = header.blob_offset.unwrap_or_default() as usize;

    let properties = BlobProperties::deserialize(r)?;
    let mut consumed = MessageHeader::SIZE + properties.record_size();
    if consumed != meta_offset {
        return Err(Error::Corrupt(format!(
            "blob properties record ends at {consumed} but user metadata offset is {meta_offset}"
        )));
    }

    let user_metadata_bytes = user_metadata::deserialize(r)?;
    consumed += user_metadata::record_size(user_metadata_bytes.len());
    if consumed != blob_offset {
        return Err(Error::Corrupt(format!(
            "user metadata record ends at {consumed} but blob offset is {blob_offset}"
        )));
    }

    let blob = blob::deserialize(r)?;
    Ok(Message::Put {
        properties,
        user_metadata: user_metadata_bytes,
        blob,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_properties(blob_size: u64) -> BlobProperties {
        BlobProperties {
            blob_size,
            service_id: Some("media-upload".to_string()),
            owner_id: None,
            content_type: Some("application/octet-stream".to_string()),
            is_private: false,
            ttl_secs: 86_400,
            creation_time_ms: 1_700_000_000_000,
        }
    }

    // Test 1: put message round trip
    #[test]
    fn test_put_message_roundtrip() {
        let properties = sample_properties(5);
        let user_metadata: Vec<u8> = vec![9, 8, 7];
        let blob_data = b"hello";

        let mut buf = BytesMut::new();
        serialize_put_message(
            &mut buf,
            &properties,
            &user_metadata,
            BlobType::Data,
            blob_data,
        );
        assert_eq!(
            buf.len(),
            put_message_size(&properties, user_metadata.len(), blob_data.len())
        );

        match read_message(&mut Cursor::new(&buf[..])).unwrap() {
            Message::Put {
                properties: p,
                user_metadata: m,
                blob,
            } => {
                assert_eq!(p, properties);
                assert_eq!(&m[..], &user_metadata[..]);
                assert_eq!(blob.blob_type, BlobType::Data);
                assert_eq!(&blob.data[..], blob_data);
            }
            other => panic!("expected put message, got {other:?}"),
        }
    }

    // Test 2: delete message round trip
    #[test]
    fn test_delete_message_roundtrip() {
        let mut buf = BytesMut::new();
        serialize_delete_message(&mut buf);
        assert_eq!(buf.len(), delete_message_size());

        match read_message(&mut Cursor::new(&buf[..])).unwrap() {
            Message::Delete { deleted } => assert!(deleted),
            other => panic!("expected delete message, got {other:?}"),
        }
    }

    // Test 3: a metadata blob carrying a metadata content record decodes
    // end to end, and the inner record reproduces the chunk key order
    #[test]
    fn test_put_message_with_metadata_blob() {
        use crate::records::metadata_content;

        let keys: Vec<String> = (0..5).map(|i| format!("chunkkey-{i:06}")).collect();
        let key_size = keys[0].len();
        let mut content = BytesMut::new();
        metadata_content::serialize(&mut content, key_size, &keys).unwrap();

        let properties = sample_properties(content.len() as u64);
        let mut buf = BytesMut::new();
        serialize_put_message(&mut buf, &properties, &[], BlobType::Metadata, &content);

        match read_message(&mut Cursor::new(&buf[..])).unwrap() {
            Message::Put { blob, .. } => {
                assert_eq!(blob.blob_type, BlobType::Metadata);
                let decoded =
                    metadata_content::deserialize(&mut Cursor::new(&blob.data[..])).unwrap();
                assert_eq!(decoded, keys);
            }
            other => panic!("expected put message, got {other:?}"),
        }
    }

    // Test 4: corruption inside any sub-record fails the whole readback
    #[test]
    fn test_corrupt_sub_record() {
        let properties = sample_properties(4);
        let mut buf = BytesMut::new();
        serialize_put_message(&mut buf, &properties, b"meta", BlobType::Data, b"data");

        // inside the blob properties record, past the header
        let mut corrupt = buf.clone();
        corrupt[MessageHeader::SIZE + 4] ^= 0x20;
        assert!(matches!(
            read_message(&mut Cursor::new(&corrupt[..])),
            Err(Error::Corrupt(_))
        ));
    }

    // Test 5: truncating the stream mid-message is reported as truncation
    #[test]
    fn test_truncated_message() {
        let properties = sample_properties(4);
        let mut buf = BytesMut::new();
        serialize_put_message(&mut buf, &properties, b"meta", BlobType::Data, b"data");
        let cut = MessageHeader::SIZE + 10;
        assert!(matches!(
            read_message(&mut Cursor::new(&buf[..cut])),
            Err(Error::Truncated)
        ));
    }
}
