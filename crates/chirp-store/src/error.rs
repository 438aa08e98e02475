use chirp_types::RecordAddress;

/// A create request that breaks the record's length rules.
///
/// The messages are shown to end users verbatim and must not change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("The provided topic should be 50 characters long maximum.")]
    TopicTooLong { len: usize },

    #[error("The provided content should be 280 characters long maximum.")]
    ContentTooLong { len: usize },

    #[error("The provided content should not be empty.")]
    ContentEmpty,
}

/// Errors from record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record was rejected before anything was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No tweet record is stored at the address.
    #[error("record not found: {0}")]
    NotFound(RecordAddress),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The log file holds data that cannot be replayed.
    #[error("corrupt record log at offset {offset}: {reason}")]
    CorruptLog { offset: u64, reason: String },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_verbatim() {
        assert_eq!(
            ValidationError::TopicTooLong { len: 51 }.to_string(),
            "The provided topic should be 50 characters long maximum."
        );
        assert_eq!(
            ValidationError::ContentTooLong { len: 281 }.to_string(),
            "The provided content should be 280 characters long maximum."
        );
    }

    #[test]
    fn store_error_is_transparent_over_validation() {
        let err = StoreError::from(ValidationError::TopicTooLong { len: 60 });
        assert_eq!(
            err.to_string(),
            "The provided topic should be 50 characters long maximum."
        );
    }
}
