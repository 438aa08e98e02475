use chirp_store::layout::{self, DISCRIMINATOR_LEN, LEN_PREFIX};
use chirp_types::{Pubkey, RecordAddress, UnixTimestamp};
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::DecodeError;

/// The decoded fields of one tweet record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TweetAccount {
    pub author: Pubkey,
    pub timestamp: UnixTimestamp,
    pub topic: String,
    pub content: String,
}

/// A decoded tweet together with the address it is stored at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tweet {
    pub address: RecordAddress,
    pub account: TweetAccount,
}

impl Tweet {
    pub fn new(address: RecordAddress, account: TweetAccount) -> Self {
        Self { address, account }
    }

    pub fn author(&self) -> &Pubkey {
        &self.account.author
    }

    pub fn topic(&self) -> &str {
        &self.account.topic
    }

    pub fn content(&self) -> &str {
        &self.account.content
    }

    /// Abbreviated author key for display.
    pub fn author_display(&self) -> String {
        self.account.author.abbreviated()
    }

    /// Creation time, or `None` if the stored seconds are out of range.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.account.timestamp.as_secs(), 0)
    }
}

impl Serialize for Tweet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Tweet", 6)?;
        s.serialize_field("address", &self.address.to_hex())?;
        s.serialize_field("author", &self.account.author.to_hex())?;
        s.serialize_field("timestamp", &self.account.timestamp.as_secs())?;
        s.serialize_field("created_at", &self.created_at().map(|t| t.to_rfc3339()))?;
        s.serialize_field("topic", &self.account.topic)?;
        s.serialize_field("content", &self.account.content)?;
        s.end()
    }
}

/// Forward-only reader over record bytes.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, field: &'static str, needed: usize) -> Result<&'a [u8], DecodeError> {
        let available = self.buf.len() - self.pos;
        if needed > available {
            return Err(DecodeError::Truncated {
                field,
                needed,
                available,
            });
        }
        let bytes = &self.buf[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(field, N)?);
        Ok(out)
    }

    fn take_string(&mut self, field: &'static str) -> Result<String, DecodeError> {
        let len = u32::from_le_bytes(self.take_array::<LEN_PREFIX>(field)?) as usize;
        let bytes = self.take(field, len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::Format {
            reason: format!("{field} is not valid UTF-8"),
        })
    }
}

/// Decode raw record bytes into their typed fields.
///
/// Bytes after the content are ignored, so records stored in padded,
/// fixed-size slots decode the same as exact-length ones.
pub fn decode(record: &[u8]) -> Result<TweetAccount, DecodeError> {
    let mut cursor = Cursor { buf: record, pos: 0 };

    let tag = cursor.take_array::<DISCRIMINATOR_LEN>("discriminator")?;
    if tag != layout::discriminator() {
        return Err(DecodeError::Format {
            reason: format!("discriminator mismatch: found {}", hex::encode(tag)),
        });
    }

    let author = Pubkey::new(cursor.take_array::<{ Pubkey::LEN }>("author")?);
    let timestamp = UnixTimestamp::from_secs(i64::from_le_bytes(cursor.take_array("timestamp")?));
    let topic = cursor.take_string("topic")?;
    let content = cursor.take_string("content")?;

    Ok(TweetAccount {
        author,
        timestamp,
        topic,
        content,
    })
}
