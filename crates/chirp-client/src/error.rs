use chirp_store::StoreError;
use chirp_types::{Pubkey, RecordAddress};
use thiserror::Error;

/// Errors from decoding raw record bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The bytes are not a tweet record, or a field is malformed.
    #[error("record format error: {reason}")]
    Format { reason: String },

    /// A fixed field or a length prefix asks for more bytes than remain.
    #[error("truncated record: {field} needs {needed} bytes, {available} available")]
    Truncated {
        field: &'static str,
        needed: usize,
        available: usize,
    },
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to decode record {address}: {source}")]
    Decode {
        address: RecordAddress,
        source: DecodeError,
    },

    #[error("signature does not authorize author {0}")]
    Unauthorized(Pubkey),
}

pub type ClientResult<T> = Result<T, ClientError>;
