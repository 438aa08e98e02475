//! Typed client for the Chirp record store.
//!
//! Translates high-level predicates into byte-offset filters ([`query`]),
//! decodes raw record bytes into [`Tweet`]s ([`decode`]), and wraps a store
//! behind the explicitly constructed [`TweetClient`].

pub mod client;
pub mod decode;
pub mod error;
pub mod instruction;
pub mod query;

pub use client::TweetClient;
pub use decode::{decode, Tweet, TweetAccount};
pub use error::{ClientError, ClientResult, DecodeError};
pub use instruction::SendTweet;

// Re-export key types
pub use chirp_crypto::SigningKey;
pub use chirp_store::{Memcmp, RecordStore};
pub use chirp_types::{Pubkey, RecordAddress, UnixTimestamp};
