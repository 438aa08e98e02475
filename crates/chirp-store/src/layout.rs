//! Binary layout of a tweet record.
//!
//! ```text
//! offset          size  field
//! 0               8     discriminator (sha256("account:Tweet")[..8])
//! 8               32    author public key
//! 40              8     timestamp, i64 LE, seconds since UNIX epoch
//! 48              4     topic length, u32 LE, in bytes
//! 52              T     topic, UTF-8
//! 52 + T          4     content length, u32 LE, in bytes
//! 56 + T          C     content, UTF-8
//! ```
//!
//! These offsets are part of the store's external contract. Clients build
//! filters against them, so any change must be versioned through the
//! discriminator.

use std::sync::OnceLock;

use bytes::{BufMut, Bytes, BytesMut};
use chirp_types::{Pubkey, UnixTimestamp};
use sha2::{Digest, Sha256};

use crate::validation::{MAX_CONTENT_LEN, MAX_TOPIC_LEN};

pub const DISCRIMINATOR_LEN: usize = 8;
pub const LEN_PREFIX: usize = 4;

pub const DISCRIMINATOR_OFFSET: usize = 0;
pub const AUTHOR_OFFSET: usize = DISCRIMINATOR_OFFSET + DISCRIMINATOR_LEN;
pub const TIMESTAMP_OFFSET: usize = AUTHOR_OFFSET + Pubkey::LEN;
pub const TOPIC_LEN_OFFSET: usize = TIMESTAMP_OFFSET + 8;
pub const TOPIC_OFFSET: usize = TOPIC_LEN_OFFSET + LEN_PREFIX;

/// Smallest well-formed record: empty topic, empty content.
pub const MIN_RECORD_LEN: usize = TOPIC_OFFSET + LEN_PREFIX;

/// Largest record the validation rules allow.
pub const MAX_RECORD_LEN: usize = MIN_RECORD_LEN + MAX_TOPIC_LEN + MAX_CONTENT_LEN;

const DISCRIMINATOR_PREIMAGE: &[u8] = b"account:Tweet";

/// The 8-byte tag every tweet record starts with.
pub fn discriminator() -> [u8; DISCRIMINATOR_LEN] {
    static TAG: OnceLock<[u8; DISCRIMINATOR_LEN]> = OnceLock::new();
    *TAG.get_or_init(|| {
        let digest = Sha256::digest(DISCRIMINATOR_PREIMAGE);
        let mut tag = [0u8; DISCRIMINATOR_LEN];
        tag.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
        tag
    })
}

/// Whether `record` starts with the tweet discriminator.
pub fn has_discriminator(record: &[u8]) -> bool {
    record.get(..DISCRIMINATOR_LEN) == Some(&discriminator()[..])
}

/// Offset of the content length prefix for a topic of `topic_len` bytes.
pub const fn content_len_offset(topic_len: usize) -> usize {
    TOPIC_OFFSET + topic_len
}

/// Read the declared topic length of a record, if the prefix is present.
pub fn topic_len(record: &[u8]) -> Option<usize> {
    read_u32_le(record, TOPIC_LEN_OFFSET).map(|len| len as usize)
}

pub(crate) fn read_u32_le(record: &[u8], offset: usize) -> Option<u32> {
    let bytes = record.get(offset..offset.checked_add(LEN_PREFIX)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Encode a record. Lengths must already have been validated.
pub fn encode(author: &Pubkey, timestamp: UnixTimestamp, topic: &str, content: &str) -> BytesMut {
    let mut buf = BytesMut::with_capacity(MIN_RECORD_LEN + topic.len() + content.len());
    buf.put_slice(&discriminator());
    buf.put_slice(author.as_bytes());
    buf.put_i64_le(timestamp.as_secs());
    buf.put_u32_le(topic.len() as u32);
    buf.put_slice(topic.as_bytes());
    buf.put_u32_le(content.len() as u32);
    buf.put_slice(content.as_bytes());
    buf
}

/// Overwrite the timestamp of an encoded record and freeze it.
pub(crate) fn stamp(mut record: BytesMut, timestamp: UnixTimestamp) -> Bytes {
    record[TIMESTAMP_OFFSET..TOPIC_LEN_OFFSET].copy_from_slice(&timestamp.as_secs().to_le_bytes());
    record.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_offsets() {
        assert_eq!(AUTHOR_OFFSET, 8);
        assert_eq!(TIMESTAMP_OFFSET, 40);
        assert_eq!(TOPIC_LEN_OFFSET, 48);
        assert_eq!(TOPIC_OFFSET, 52);
        assert_eq!(content_len_offset(5), 57);
        assert_eq!(MAX_RECORD_LEN, 8 + 32 + 8 + 4 + 50 + 4 + 280);
    }

    #[test]
    fn discriminator_is_stable() {
        let digest = Sha256::digest(b"account:Tweet");
        assert_eq!(&discriminator()[..], &digest[..8]);
        assert_eq!(discriminator(), discriminator());
    }

    #[test]
    fn encode_places_fields_at_documented_offsets() {
        let author = Pubkey::new([7; 32]);
        let record = encode(&author, UnixTimestamp::from_secs(1234), "odrow", "cuto ha");

        assert_eq!(record.len(), MIN_RECORD_LEN + 5 + 7);
        assert!(has_discriminator(&record));
        assert_eq!(&record[8..40], author.as_bytes());
        assert_eq!(&record[40..48], &1234i64.to_le_bytes());
        assert_eq!(topic_len(&record), Some(5));
        assert_eq!(&record[52..57], b"odrow");
        assert_eq!(read_u32_le(&record, 57), Some(7));
        assert_eq!(&record[61..], b"cuto ha");
    }

    #[test]
    fn stamp_rewrites_only_the_timestamp() {
        let author = Pubkey::new([1; 32]);
        let draft = encode(&author, UnixTimestamp::from_secs(0), "t", "c");
        let expected = encode(&author, UnixTimestamp::from_secs(-5), "t", "c").freeze();
        assert_eq!(stamp(draft, UnixTimestamp::from_secs(-5)), expected);
    }

    #[test]
    fn short_buffers_have_no_discriminator_or_topic_len() {
        assert!(!has_discriminator(&[0u8; 4]));
        assert_eq!(topic_len(&[0u8; 50]), None);
    }
}
