//! Author keys for Chirp.
//!
//! Wraps Ed25519 signing and verification. A [`SigningKey`]'s public half is
//! the [`chirp_types::Pubkey`] recorded as a tweet's author.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod signer;

pub use signer::{Signature, SignatureError, SigningKey, VerifyingKey};
