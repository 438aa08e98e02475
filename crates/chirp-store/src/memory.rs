use std::sync::{Arc, RwLock};

use bytes::Bytes;
use chirp_types::{Clock, Pubkey, RecordAddress, SystemClock, UnixTimestamp};
use tracing::debug;

use crate::error::StoreResult;
use crate::filter::Memcmp;
use crate::layout;
use crate::table::{self, RecordTable};
use crate::traits::{RecordStore, StoredRecord};
use crate::validation;

/// In-memory, `Vec`-backed record store.
///
/// Intended for tests and embedding. Records are held behind a `RwLock`;
/// payloads are reference-counted so reads and scans never copy record
/// bytes.
pub struct InMemoryRecordStore {
    clock: Arc<dyn Clock>,
    table: RwLock<RecordTable>,
}

impl InMemoryRecordStore {
    /// Create a new empty store stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a new empty store stamped by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            table: RwLock::new(RecordTable::default()),
        }
    }

    /// Total bytes across all stored records.
    pub fn total_bytes(&self) -> usize {
        self.table.read().expect("lock poisoned").total_bytes()
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn create(&self, author: &Pubkey, topic: &str, content: &str) -> StoreResult<RecordAddress> {
        validation::validate(topic, content)?;
        let draft = layout::encode(author, UnixTimestamp::from_secs(0), topic, content);

        let mut table = self.table.write().expect("lock poisoned");
        let address = table.fresh_address();
        let timestamp = table.next_timestamp(self.clock.as_ref());
        let data = layout::stamp(draft, timestamp);
        debug!(address = %address.short_hex(), len = data.len(), "record committed");
        table.push(StoredRecord { address, data }, timestamp);
        Ok(address)
    }

    fn get(&self, address: &RecordAddress) -> StoreResult<Bytes> {
        self.table.read().expect("lock poisoned").get(address)
    }

    fn scan(&self, filters: &[Memcmp]) -> StoreResult<Vec<StoredRecord>> {
        let snapshot = self.table.read().expect("lock poisoned").snapshot();
        let matched = table::scan_snapshot(snapshot, filters);
        debug!(filters = filters.len(), matched = matched.len(), "scan");
        Ok(matched)
    }

    fn len(&self) -> usize {
        self.table.read().expect("lock poisoned").len()
    }
}

impl std::fmt::Debug for InMemoryRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRecordStore")
            .field("record_count", &self.len())
            .finish()
    }
}
