use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use bytes::{BufMut, Bytes, BytesMut};
use chirp_types::{Clock, Pubkey, RecordAddress, SystemClock, UnixTimestamp};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::filter::Memcmp;
use crate::layout;
use crate::table::{self, RecordTable};
use crate::traits::{RecordStore, StoredRecord};
use crate::validation;

/// Sync strategy for the record log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// `fsync` after every record (safest, highest latency).
    EveryWrite,
    /// Hand each record to the OS and rely on its page cache.
    #[default]
    OsDefault,
}

/// Configuration for a [`FileRecordStore`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FileStoreConfig {
    #[serde(default)]
    pub sync_mode: SyncMode,
}

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

struct LogState {
    table: RecordTable,
    file: File,
    /// End of the last complete entry in the log file.
    offset: u64,
}

/// Durable record store backed by an append-only log file.
///
/// On-disk entry format:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [32 bytes: record address]
/// [N bytes: encoded record]
/// ```
///
/// On open the log is replayed front to back. A complete entry that fails
/// its CRC is skipped and replay carries on past it. An entry that runs past
/// the end of the file is a torn write; the file is cut back to the end of
/// the last complete entry so later appends start from a clean tail.
pub struct FileRecordStore {
    path: PathBuf,
    config: FileStoreConfig,
    clock: Arc<dyn Clock>,
    state: RwLock<LogState>,
}

impl FileRecordStore {
    /// Open (or create) a record log at `path`, stamped by the system clock.
    pub fn open(path: &Path, config: FileStoreConfig) -> StoreResult<Self> {
        Self::open_with_clock(path, config, Arc::new(SystemClock))
    }

    pub fn open_with_clock(
        path: &Path,
        config: FileStoreConfig,
        clock: Arc<dyn Clock>,
    ) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        let (table, valid_len) = replay(&contents)?;

        if valid_len < contents.len() as u64 {
            warn!(
                path = %path.display(),
                valid_len,
                file_len = contents.len(),
                "discarding torn tail of record log"
            );
            file.set_len(valid_len)?;
        }

        info!(path = %path.display(), records = table.len(), "record log opened");

        Ok(Self {
            path: path.to_path_buf(),
            config,
            clock,
            state: RwLock::new(LogState {
                table,
                file,
                offset: valid_len,
            }),
        })
    }

    /// Path of the backing log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append_entry(&self, state: &mut LogState, address: &RecordAddress, data: &[u8]) -> StoreResult<()> {
        let payload_len = RecordAddress::LEN + data.len();
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(address.as_bytes());
        hasher.update(data);
        let crc = hasher.finalize();

        // The entry goes out in a single write so a failure leaves at most
        // one torn tail, which is cut off below or on the next open.
        let mut entry = BytesMut::with_capacity(HEADER_SIZE + payload_len);
        entry.put_u32_le(payload_len as u32);
        entry.put_u32_le(crc);
        entry.put_slice(address.as_bytes());
        entry.put_slice(data);

        let written = state.file.write_all(&entry).and_then(|()| {
            if self.config.sync_mode == SyncMode::EveryWrite {
                state.file.sync_all()
            } else {
                Ok(())
            }
        });

        if let Err(e) = written {
            if let Err(truncate) = state.file.set_len(state.offset) {
                warn!(error = %truncate, "failed to cut back partial log entry");
            }
            return Err(e.into());
        }

        state.offset += entry.len() as u64;
        Ok(())
    }
}

/// Rebuild the record table from raw log bytes.
///
/// Returns the table and the end offset of the last complete entry.
/// Anything past that offset is a torn tail.
fn replay(contents: &[u8]) -> StoreResult<(RecordTable, u64)> {
    let mut table = RecordTable::default();
    let mut offset = 0usize;
    let mut skipped = 0usize;

    while offset + HEADER_SIZE <= contents.len() {
        let header = &contents[offset..offset + HEADER_SIZE];
        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        let start = offset + HEADER_SIZE;
        let end = start + length;
        if end > contents.len() {
            warn!(offset, length, "record log entry runs past end of file; stopping replay");
            break;
        }
        if length < RecordAddress::LEN {
            return Err(StoreError::CorruptLog {
                offset: offset as u64,
                reason: format!("entry length {length} is shorter than a record address"),
            });
        }

        let payload = &contents[start..end];
        if crc32fast::hash(payload) != expected_crc {
            warn!(offset, length, "CRC mismatch in record log; skipping entry");
            skipped += 1;
            offset = end;
            continue;
        }

        let mut raw = [0u8; RecordAddress::LEN];
        raw.copy_from_slice(&payload[..RecordAddress::LEN]);
        let address = RecordAddress::from_bytes(raw);
        if table.holds(&address) {
            return Err(StoreError::CorruptLog {
                offset: offset as u64,
                reason: format!("duplicate record address {address}"),
            });
        }

        let data = Bytes::copy_from_slice(&payload[RecordAddress::LEN..]);
        let timestamp = data
            .get(layout::TIMESTAMP_OFFSET..layout::TOPIC_LEN_OFFSET)
            .map(|b| {
                let mut secs = [0u8; 8];
                secs.copy_from_slice(b);
                UnixTimestamp::from_secs(i64::from_le_bytes(secs))
            })
            .unwrap_or(UnixTimestamp::from_secs(i64::MIN));
        table.push(StoredRecord { address, data }, timestamp);

        offset = end;
    }

    debug!(recovered = table.len(), skipped, "record log replay complete");
    Ok((table, offset as u64))
}

impl RecordStore for FileRecordStore {
    fn create(&self, author: &Pubkey, topic: &str, content: &str) -> StoreResult<RecordAddress> {
        validation::validate(topic, content)?;
        let draft = layout::encode(author, UnixTimestamp::from_secs(0), topic, content);

        let mut state = self.state.write().expect("lock poisoned");
        let address = state.table.fresh_address();
        let timestamp = state.table.next_timestamp(self.clock.as_ref());
        let data = layout::stamp(draft, timestamp);

        self.append_entry(&mut state, &address, &data)?;
        debug!(address = %address.short_hex(), len = data.len(), "record appended to log");
        state.table.push(StoredRecord { address, data }, timestamp);
        Ok(address)
    }

    fn get(&self, address: &RecordAddress) -> StoreResult<Bytes> {
        self.state.read().expect("lock poisoned").table.get(address)
    }

    fn scan(&self, filters: &[Memcmp]) -> StoreResult<Vec<StoredRecord>> {
        let snapshot = self.state.read().expect("lock poisoned").table.snapshot();
        Ok(table::scan_snapshot(snapshot, filters))
    }

    fn len(&self) -> usize {
        self.state.read().expect("lock poisoned").table.len()
    }
}

impl std::fmt::Debug for FileRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileRecordStore")
            .field("path", &self.path)
            .field("record_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use chirp_types::ManualClock;
    use tempfile::TempDir;

    fn author(n: u8) -> Pubkey {
        Pubkey::new([n; 32])
    }

    fn log_path(dir: &TempDir) -> PathBuf {
        dir.path().join("tweets.log")
    }

    #[test]
    fn create_and_reopen() {
        let dir = TempDir::new().unwrap();
        let path = log_path(&dir);

        let (a, b) = {
            let store = FileRecordStore::open(&path, FileStoreConfig::default()).unwrap();
            let a = store.create(&author(1), "odrow", "cuto ha").unwrap();
            let b = store.create(&author(2), "", "no topic").unwrap();
            (a, b)
        };

        let store = FileRecordStore::open(&path, FileStoreConfig::default()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(&store.get(&a).unwrap()[52..57], b"odrow");
        assert!(store.contains(&b));

        let order: Vec<_> = store.scan(&[]).unwrap().into_iter().map(|r| r.address).collect();
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("tweets.log");
        let store = FileRecordStore::open(&path, FileStoreConfig::default()).unwrap();
        store.create(&author(1), "", "x").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn rejected_create_leaves_log_untouched() {
        let dir = TempDir::new().unwrap();
        let path = log_path(&dir);
        let store = FileRecordStore::open(&path, FileStoreConfig::default()).unwrap();

        let err = store.create(&author(1), &"x".repeat(51), "fail").unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::TopicTooLong { len: 51 })
        ));
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn torn_tail_is_discarded_on_open() {
        let dir = TempDir::new().unwrap();
        let path = log_path(&dir);

        let good = {
            let store = FileRecordStore::open(&path, FileStoreConfig::default()).unwrap();
            store.create(&author(1), "t", "survives").unwrap()
        };
        let good_len = fs::metadata(&path).unwrap().len();

        // Simulate a crash halfway through the next entry.
        let mut f = OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(&200u32.to_le_bytes()).unwrap();
        f.write_all(&[0xAB; 20]).unwrap();
        drop(f);

        let store = FileRecordStore::open(&path, FileStoreConfig::default()).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.contains(&good));
        assert_eq!(fs::metadata(&path).unwrap().len(), good_len);

        // Appends continue from the clean tail.
        let next = store.create(&author(1), "t", "after recovery").unwrap();
        drop(store);
        let store = FileRecordStore::open(&path, FileStoreConfig::default()).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.contains(&next));
    }

    #[test]
    fn crc_mismatch_skips_only_the_damaged_entry() {
        let dir = TempDir::new().unwrap();
        let path = log_path(&dir);
        let (first_entry_len, addresses) = {
            let store = FileRecordStore::open(&path, FileStoreConfig::default()).unwrap();
            let first = store.create(&author(1), "", "first").unwrap();
            let first_entry_len = fs::metadata(&path).unwrap().len() as usize;
            let mut addresses = vec![first];
            for i in 1..10 {
                addresses.push(store.create(&author(1), "t", &format!("tweet {i}")).unwrap());
            }
            (first_entry_len, addresses)
        };

        // Flip the last content byte of the first record.
        let mut bytes = fs::read(&path).unwrap();
        bytes[first_entry_len - 1] ^= 0xFF;
        fs::write(&path, &bytes).unwrap();
        let file_len = bytes.len() as u64;

        let store = FileRecordStore::open(&path, FileStoreConfig::default()).unwrap();
        assert_eq!(store.len(), 9);
        assert!(!store.contains(&addresses[0]));
        for address in &addresses[1..] {
            assert!(store.contains(address));
        }
        assert_eq!(fs::metadata(&path).unwrap().len(), file_len);

        // Appends land after the skipped entry and survive another reopen.
        let next = store.create(&author(2), "", "after recovery").unwrap();
        drop(store);
        let store = FileRecordStore::open(&path, FileStoreConfig::default()).unwrap();
        assert_eq!(store.len(), 10);
        assert!(store.contains(&next));
    }

    #[test]
    fn short_length_header_is_corrupt_and_file_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = log_path(&dir);
        {
            let store = FileRecordStore::open(&path, FileStoreConfig::default()).unwrap();
            store.create(&author(1), "", "first").unwrap();
            store.create(&author(1), "", "second").unwrap();
        }

        // Claim the first entry is only 4 bytes long.
        let mut bytes = fs::read(&path).unwrap();
        bytes[..4].copy_from_slice(&4u32.to_le_bytes());
        fs::write(&path, &bytes).unwrap();

        let err = FileRecordStore::open(&path, FileStoreConfig::default()).unwrap_err();
        assert!(matches!(err, StoreError::CorruptLog { offset: 0, .. }));
        assert_eq!(fs::metadata(&path).unwrap().len(), bytes.len() as u64);
    }

    #[test]
    fn timestamps_stay_monotonic_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = log_path(&dir);
        let clock = Arc::new(ManualClock::new(UnixTimestamp::from_secs(1_000)));
        {
            let store =
                FileRecordStore::open_with_clock(&path, FileStoreConfig::default(), clock.clone())
                    .unwrap();
            store.create(&author(1), "", "early").unwrap();
        }

        clock.set(UnixTimestamp::from_secs(10));
        let store =
            FileRecordStore::open_with_clock(&path, FileStoreConfig::default(), clock.clone())
                .unwrap();
        let address = store.create(&author(1), "", "late").unwrap();
        assert_eq!(&store.get(&address).unwrap()[40..48], &1_000i64.to_le_bytes());
    }

    #[test]
    fn every_write_sync_mode() {
        let dir = TempDir::new().unwrap();
        let config = FileStoreConfig {
            sync_mode: SyncMode::EveryWrite,
        };
        let store = FileRecordStore::open(&log_path(&dir), config).unwrap();
        store.create(&author(1), "durable", "fsynced").unwrap();
        assert_eq!(store.scan(&[]).unwrap().len(), 1);
    }

    #[test]
    fn concurrent_appends_replay_completely() {
        use std::thread;

        let dir = TempDir::new().unwrap();
        let path = log_path(&dir);
        {
            let store = Arc::new(FileRecordStore::open(&path, FileStoreConfig::default()).unwrap());
            let handles: Vec<_> = (0..4u8)
                .map(|t| {
                    let store = Arc::clone(&store);
                    thread::spawn(move || {
                        for i in 0..10 {
                            store.create(&author(t), "load", &format!("{t}-{i}")).unwrap();
                        }
                    })
                })
                .collect();
            for h in handles {
                h.join().expect("thread should not panic");
            }
        }

        let store = FileRecordStore::open(&path, FileStoreConfig::default()).unwrap();
        assert_eq!(store.len(), 40);
    }
}
