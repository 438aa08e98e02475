use std::collections::HashMap;

use chirp_types::{Clock, RecordAddress, UnixTimestamp};

use crate::error::{StoreError, StoreResult};
use crate::filter;
use crate::layout;
use crate::traits::StoredRecord;

/// Committed records in insertion order, shared by every backend.
///
/// `len`, `get`, `contains` and scans only see tweet records. The address
/// index covers every entry so addresses stay unique regardless.
#[derive(Default)]
pub(crate) struct RecordTable {
    records: Vec<StoredRecord>,
    index: HashMap<RecordAddress, usize>,
    tweet_count: usize,
    last_timestamp: Option<UnixTimestamp>,
}

impl RecordTable {
    pub(crate) fn len(&self) -> usize {
        self.tweet_count
    }

    /// An address not held by any committed record.
    pub(crate) fn fresh_address(&self) -> RecordAddress {
        loop {
            let address = RecordAddress::random();
            if !self.index.contains_key(&address) {
                return address;
            }
        }
    }

    /// The clock reading, clamped so it never precedes an earlier record.
    pub(crate) fn next_timestamp(&self, clock: &dyn Clock) -> UnixTimestamp {
        let now = clock.now();
        match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        }
    }

    pub(crate) fn push(&mut self, record: StoredRecord, timestamp: UnixTimestamp) {
        if layout::has_discriminator(&record.data) {
            self.tweet_count += 1;
        }
        self.index.insert(record.address, self.records.len());
        self.records.push(record);
        self.last_timestamp = Some(self.last_timestamp.map_or(timestamp, |t| t.max(timestamp)));
    }

    pub(crate) fn get(&self, address: &RecordAddress) -> StoreResult<bytes::Bytes> {
        self.index
            .get(address)
            .map(|&i| &self.records[i])
            .filter(|record| layout::has_discriminator(&record.data))
            .map(|record| record.data.clone())
            .ok_or(StoreError::NotFound(*address))
    }

    pub(crate) fn contains(&self, address: &RecordAddress) -> bool {
        self.get(address).is_ok()
    }

    /// Whether any entry, tweet or not, already uses `address`.
    pub(crate) fn holds(&self, address: &RecordAddress) -> bool {
        self.index.contains_key(address)
    }

    pub(crate) fn total_bytes(&self) -> usize {
        self.records.iter().map(|record| record.data.len()).sum()
    }

    /// Cheap copy of the record list; the payloads are shared.
    pub(crate) fn snapshot(&self) -> Vec<StoredRecord> {
        self.records.clone()
    }
}

/// Evaluate `filters` over a snapshot, skipping anything that is not a
/// tweet record.
pub(crate) fn scan_snapshot(snapshot: Vec<StoredRecord>, filters: &[filter::Memcmp]) -> Vec<StoredRecord> {
    snapshot
        .into_iter()
        .filter(|record| layout::has_discriminator(&record.data))
        .filter(|record| filter::matches_all(filters, &record.data))
        .collect()
}
