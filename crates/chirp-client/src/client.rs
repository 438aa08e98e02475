use std::sync::Arc;

use chirp_crypto::SigningKey;
use chirp_store::{Memcmp, RecordStore, StoredRecord};
use chirp_types::{Pubkey, RecordAddress};
use tracing::{debug, info};

use crate::decode::{decode, Tweet};
use crate::error::{ClientError, ClientResult};
use crate::instruction::SendTweet;
use crate::query;

/// Handle to a record store plus the wallet that posts by default.
///
/// Construct one explicitly and pass it to whatever needs it; clones share
/// the same store.
#[derive(Clone)]
pub struct TweetClient {
    store: Arc<dyn RecordStore>,
    wallet: Arc<SigningKey>,
}

impl TweetClient {
    pub fn new(store: Arc<dyn RecordStore>, wallet: SigningKey) -> Self {
        Self {
            store,
            wallet: Arc::new(wallet),
        }
    }

    /// The identity tweets are posted under by [`send_tweet`](Self::send_tweet).
    pub fn wallet_pubkey(&self) -> Pubkey {
        self.wallet.pubkey()
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    // ---- Writes ----

    /// Post a tweet as the client's wallet.
    pub fn send_tweet(&self, topic: &str, content: &str) -> ClientResult<Tweet> {
        self.send_tweet_as(&self.wallet, topic, content)
    }

    /// Post a tweet as another signer.
    pub fn send_tweet_as(&self, signer: &SigningKey, topic: &str, content: &str) -> ClientResult<Tweet> {
        self.submit(&SendTweet::new(signer, topic, content))
    }

    /// Verify a signed request, commit it, and read the record back.
    pub fn submit(&self, ix: &SendTweet) -> ClientResult<Tweet> {
        ix.verify().map_err(|_| ClientError::Unauthorized(ix.author))?;
        let address = self.store.create(&ix.author, &ix.topic, &ix.content)?;
        info!(address = %address.short_hex(), author = %ix.author.abbreviated(), "tweet sent");
        self.fetch(&address)
    }

    // ---- Reads ----

    pub fn fetch(&self, address: &RecordAddress) -> ClientResult<Tweet> {
        let data = self.store.get(address)?;
        decode_record(*address, &data)
    }

    /// Every tweet in the store.
    pub fn all(&self) -> ClientResult<Vec<Tweet>> {
        self.filter(&[])
    }

    /// Every tweet matching all `filters`.
    pub fn filter(&self, filters: &[Memcmp]) -> ClientResult<Vec<Tweet>> {
        let records = self.store.scan(filters)?;
        debug!(filters = filters.len(), matched = records.len(), "filtered tweets");
        records
            .into_iter()
            .map(|StoredRecord { address, data }| decode_record(address, &data))
            .collect()
    }

    pub fn by_author(&self, author: &Pubkey) -> ClientResult<Vec<Tweet>> {
        self.filter(&query::by_author(author))
    }

    pub fn by_topic(&self, topic: &str) -> ClientResult<Vec<Tweet>> {
        self.filter(&query::by_topic(topic))
    }
}

fn decode_record(address: RecordAddress, data: &[u8]) -> ClientResult<Tweet> {
    let account = decode(data).map_err(|source| ClientError::Decode { address, source })?;
    Ok(Tweet::new(address, account))
}

impl std::fmt::Debug for TweetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweetClient")
            .field("wallet", &self.wallet.pubkey())
            .field("record_count", &self.store.len())
            .finish()
    }
}
