//! Append-only record store for Chirp tweets.
//!
//! Every tweet is committed as one immutable, fixed-layout binary record
//! (see [`layout`]) and identified by a fresh [`RecordAddress`]. Records are
//! retrieved by address or by scanning with byte-offset [`Memcmp`] filters,
//! which compare raw bytes without decoding the record.
//!
//! # Storage Backends
//!
//! All backends implement the [`RecordStore`] trait:
//!
//! - [`InMemoryRecordStore`] -- `Vec`-backed store for tests and embedding
//! - [`FileRecordStore`] -- append-only, CRC-framed log file
//!
//! # Design Rules
//!
//! 1. Records are immutable once committed. There is no update or delete.
//! 2. Validation runs before anything is written; a rejected create leaves
//!    the store untouched.
//! 3. Address allocation, timestamping and the append are serialized under a
//!    single write lock, so no reader ever observes a partial record.
//! 4. Scans work on a snapshot of the record list and never block writers
//!    while filters are evaluated.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod filter;
pub mod layout;
pub mod memory;
mod table;
pub mod traits;
pub mod validation;

pub use chirp_types::{Pubkey, RecordAddress, UnixTimestamp};
pub use error::{StoreError, StoreResult, ValidationError};
pub use file::{FileRecordStore, FileStoreConfig, SyncMode};
pub use filter::{FilterOffset, Memcmp};
pub use memory::InMemoryRecordStore;
pub use traits::{RecordStore, StoredRecord};
