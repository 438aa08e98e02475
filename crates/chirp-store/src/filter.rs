//! Byte-offset filters evaluated against raw record bytes.

use serde::{Deserialize, Serialize};

use crate::layout;

/// Where a filter starts comparing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOffset {
    /// A fixed position from the start of the record.
    Absolute(usize),
    /// A position relative to the content length prefix, whose location
    /// depends on each record's topic length.
    AfterTopic(usize),
}

impl FilterOffset {
    /// Resolve to an absolute position within `record`.
    ///
    /// Returns `None` when the record is too short to declare a topic length.
    pub fn resolve(&self, record: &[u8]) -> Option<usize> {
        match *self {
            Self::Absolute(offset) => Some(offset),
            Self::AfterTopic(delta) => {
                let topic_len = layout::topic_len(record)?;
                layout::content_len_offset(topic_len).checked_add(delta)
            }
        }
    }
}

/// Match records whose bytes at `offset` equal `bytes`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Memcmp {
    pub offset: FilterOffset,
    pub bytes: Vec<u8>,
}

impl Memcmp {
    pub fn new(offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            offset: FilterOffset::Absolute(offset),
            bytes: bytes.into(),
        }
    }

    pub fn after_topic(delta: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            offset: FilterOffset::AfterTopic(delta),
            bytes: bytes.into(),
        }
    }

    /// A comparison that runs past the end of the record does not match.
    pub fn matches(&self, record: &[u8]) -> bool {
        let Some(start) = self.offset.resolve(record) else {
            return false;
        };
        let Some(end) = start.checked_add(self.bytes.len()) else {
            return false;
        };
        record.get(start..end) == Some(self.bytes.as_slice())
    }
}

/// Conjunction of `filters`. An empty slice matches every record.
pub fn matches_all(filters: &[Memcmp], record: &[u8]) -> bool {
    filters.iter().all(|filter| filter.matches(record))
}
