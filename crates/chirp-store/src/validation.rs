use crate::error::ValidationError;

/// Maximum topic length in bytes.
pub const MAX_TOPIC_LEN: usize = 50;

/// Maximum content length in bytes.
pub const MAX_CONTENT_LEN: usize = 280;

/// Check a create request. The topic is checked before the content.
///
/// Lengths are UTF-8 byte counts, not character counts.
pub fn validate(topic: &str, content: &str) -> Result<(), ValidationError> {
    if topic.len() > MAX_TOPIC_LEN {
        return Err(ValidationError::TopicTooLong { len: topic.len() });
    }
    if content.len() > MAX_CONTENT_LEN {
        return Err(ValidationError::ContentTooLong { len: content.len() });
    }
    if content.is_empty() {
        return Err(ValidationError::ContentEmpty);
    }
    Ok(())
}
