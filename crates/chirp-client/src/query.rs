//! Filter builders for the byte offsets of the tweet record layout.
//!
//! Each builder returns a filter list that can be passed straight to
//! [`RecordStore::scan`](chirp_store::RecordStore::scan). Lists can be
//! concatenated to combine predicates; the store ANDs them.

use chirp_store::layout::{AUTHOR_OFFSET, LEN_PREFIX, TOPIC_LEN_OFFSET, TOPIC_OFFSET};
use chirp_store::Memcmp;
use chirp_types::Pubkey;

/// Records written by `author`.
pub fn by_author(author: &Pubkey) -> Vec<Memcmp> {
    vec![Memcmp::new(AUTHOR_OFFSET, author.as_bytes().to_vec())]
}

/// Records whose topic is exactly `topic`.
///
/// The expected bytes start at the topic length prefix, so "odrowX" does
/// not match a query for "odrow".
pub fn by_topic(topic: &str) -> Vec<Memcmp> {
    let mut bytes = Vec::with_capacity(LEN_PREFIX + topic.len());
    bytes.extend_from_slice(&(topic.len() as u32).to_le_bytes());
    bytes.extend_from_slice(topic.as_bytes());
    vec![Memcmp::new(TOPIC_LEN_OFFSET, bytes)]
}

/// Records whose topic starts with `prefix`.
///
/// This compares raw bytes at the topic offset and ignores the declared
/// topic length. A record with a shorter topic can still match if its
/// content bytes happen to line up with the rest of `prefix`.
pub fn by_topic_prefix(prefix: &str) -> Vec<Memcmp> {
    vec![Memcmp::new(TOPIC_OFFSET, prefix.as_bytes().to_vec())]
}

/// Records whose content starts with `prefix`, wherever the content begins.
pub fn by_content_prefix(prefix: &str) -> Vec<Memcmp> {
    vec![Memcmp::after_topic(LEN_PREFIX, prefix.as_bytes().to_vec())]
}
