use bytes::Bytes;
use chirp_types::{Pubkey, RecordAddress};

use crate::error::StoreResult;
use crate::filter::Memcmp;

/// A committed record: its address and its raw encoded bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredRecord {
    pub address: RecordAddress,
    pub data: Bytes,
}

/// Append-only tweet record store.
///
/// All implementations must satisfy these invariants:
/// - `create` validates the topic length, then the content length, and
///   writes nothing when either check fails.
/// - A committed record is fully visible to every later read, and no reader
///   ever observes part of a record.
/// - Records are never modified or removed once committed.
/// - Addresses are never reused.
/// - Timestamps never go backwards within one store.
pub trait RecordStore: Send + Sync {
    /// Validate and append a new record, returning its fresh address.
    fn create(&self, author: &Pubkey, topic: &str, content: &str) -> StoreResult<RecordAddress>;

    /// Raw bytes of the tweet record at `address`.
    ///
    /// Returns `NotFound` if nothing is stored there or the stored bytes are
    /// not a tweet record.
    fn get(&self, address: &RecordAddress) -> StoreResult<Bytes>;

    /// Every record matching all `filters`, in store iteration order.
    ///
    /// An empty filter list returns every record.
    fn scan(&self, filters: &[Memcmp]) -> StoreResult<Vec<StoredRecord>>;

    /// Number of committed records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, address: &RecordAddress) -> bool {
        self.get(address).is_ok()
    }
}
