//! Foundation types for Chirp.
//!
//! Every other Chirp crate depends on `chirp-types`.
//!
//! # Key Types
//!
//! - [`Pubkey`]: 32-byte public identity of a record's author
//! - [`RecordAddress`]: Unique, store-assigned identifier of a record
//! - [`UnixTimestamp`]: Creation time in whole seconds since the UNIX epoch
//! - [`Clock`]: Source of the ambient time used when committing records

pub mod address;
pub mod clock;
pub mod error;
pub mod identity;

pub use address::RecordAddress;
pub use clock::{Clock, ManualClock, SystemClock, UnixTimestamp};
pub use error::TypeError;
pub use identity::Pubkey;
