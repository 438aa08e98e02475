use chirp_crypto::{Signature, SignatureError, SigningKey, VerifyingKey};
use chirp_types::Pubkey;
use serde::{Deserialize, Serialize};

const SEND_TWEET_DOMAIN: &[u8] = b"chirp-send-tweet-v1:";

/// A request to post a tweet, signed by its author.
///
/// The signature covers the author key, topic and content, so a request
/// cannot be replayed under a different author or with altered text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendTweet {
    pub author: Pubkey,
    pub topic: String,
    pub content: String,
    pub signature: Signature,
}

impl SendTweet {
    /// Build and sign a request as `signer`.
    pub fn new(signer: &SigningKey, topic: impl Into<String>, content: impl Into<String>) -> Self {
        let author = signer.pubkey();
        let topic = topic.into();
        let content = content.into();
        let signature = signer.sign(&signing_message(&author, &topic, &content));
        Self {
            author,
            topic,
            content,
            signature,
        }
    }

    /// Check that the author key signed this exact request.
    pub fn verify(&self) -> Result<(), SignatureError> {
        let key = VerifyingKey::from_pubkey(&self.author)?;
        key.verify(
            &signing_message(&self.author, &self.topic, &self.content),
            &self.signature,
        )
    }
}

/// Canonical bytes an author signs.
fn signing_message(author: &Pubkey, topic: &str, content: &str) -> Vec<u8> {
    let mut message =
        Vec::with_capacity(SEND_TWEET_DOMAIN.len() + Pubkey::LEN + 8 + topic.len() + content.len());
    message.extend_from_slice(SEND_TWEET_DOMAIN);
    message.extend_from_slice(author.as_bytes());
    message.extend_from_slice(&(topic.len() as u32).to_le_bytes());
    message.extend_from_slice(topic.as_bytes());
    message.extend_from_slice(&(content.len() as u32).to_le_bytes());
    message.extend_from_slice(content.as_bytes());
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_request_verifies() {
        let signer = SigningKey::generate();
        let ix = SendTweet::new(&signer, "odrow", "cuto ha");
        assert_eq!(ix.author, signer.pubkey());
        assert!(ix.verify().is_ok());
    }

    #[test]
    fn tampered_content_fails() {
        let signer = SigningKey::generate();
        let mut ix = SendTweet::new(&signer, "odrow", "cuto ha");
        ix.content = "something else".into();
        assert_eq!(ix.verify(), Err(SignatureError::InvalidSignature));
    }

    #[test]
    fn swapped_author_fails() {
        let signer = SigningKey::generate();
        let mut ix = SendTweet::new(&signer, "odrow", "cuto ha");
        ix.author = SigningKey::generate().pubkey();
        assert!(ix.verify().is_err());
    }

    #[test]
    fn topic_and_content_boundary_is_unambiguous() {
        let signer = SigningKey::generate();
        let mut ix = SendTweet::new(&signer, "ab", "c");
        ix.topic = "a".into();
        ix.content = "bc".into();
        assert!(ix.verify().is_err());
    }

    #[test]
    fn signing_message_binds_the_author() {
        let signer = SigningKey::generate();
        let author = signer.pubkey();
        let message = signing_message(&author, "odrow", "cuto ha");

        let (domain, rest) = message.split_at(SEND_TWEET_DOMAIN.len());
        assert_eq!(domain, SEND_TWEET_DOMAIN);
        assert_eq!(&rest[..Pubkey::LEN], author.as_bytes());
        assert_eq!(&rest[Pubkey::LEN..Pubkey::LEN + 4], &5u32.to_le_bytes());
        assert_eq!(message.len(), SEND_TWEET_DOMAIN.len() + Pubkey::LEN + 4 + 5 + 4 + 7);

        let mut ix = SendTweet::new(&signer, "odrow", "cuto ha");
        ix.author = SigningKey::generate().pubkey();
        assert!(ix.verify().is_err());
    }

    #[test]
    fn json_roundtrip_keeps_signature_valid() {
        let signer = SigningKey::generate();
        let ix = SendTweet::new(&signer, "", "no topic");
        let json = serde_json::to_string(&ix).unwrap();
        let parsed: SendTweet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ix);
        assert!(parsed.verify().is_ok());
    }
}
