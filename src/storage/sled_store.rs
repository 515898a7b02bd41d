use chrono::Utc;
use serde::{Deserialize, Serialize};
use sled::Db;

use crate::storage::SubscriptionStore;
use crate::subscriber::Subscriber;
use crate::utils::error::StorageError;

const CHANNELS_TREE: &str = "channels";

fn topic_tree_name(topic: &str) -> String {
    format!("topic:{topic}")
}

/// On-disk subscriber record.
///
/// `seq` is the key of this record's entry in its topic tree, so removal
/// never has to scan the tree.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct StoredRecord {
    subscriber: Subscriber,
    seq: u64,
    registered_at: i64,
}

/// Durable subscription store backed by an embedded `sled` database.
///
/// Registrations survive the registering process: one tree maps channels to
/// records, and each topic gets its own tree keyed by a monotonic sequence,
/// so iteration order is registration order. Expired records are cleaned up
/// lazily on the reads that encounter them.
#[derive(Clone)]
pub struct SledStore {
    db: Db,
    ttl_seconds: Option<i64>,
}

impl SledStore {
    pub fn new(path: &str, ttl_seconds: Option<i64>) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Ok(Self { db, ttl_seconds })
    }

    fn channels(&self) -> Result<sled::Tree, StorageError> {
        Ok(self.db.open_tree(CHANNELS_TREE)?)
    }

    fn topic_tree(&self, topic: &str) -> Result<sled::Tree, StorageError> {
        Ok(self.db.open_tree(topic_tree_name(topic))?)
    }

    fn is_expired(&self, registered_at: i64) -> bool {
        match self.ttl_seconds {
            Some(ttl) => Utc::now().timestamp() - registered_at >= ttl,
            None => false,
        }
    }

    /// Removes a record from both indexes, dropping the topic tree when it
    /// holds nothing else.
    fn remove_record(&self, record: &StoredRecord) -> Result<(), StorageError> {
        self.channels()?
            .remove(record.subscriber.channel.as_bytes())?;
        let tree = self.topic_tree(&record.subscriber.topic)?;
        tree.remove(record.seq.to_be_bytes())?;
        if tree.is_empty() {
            self.db.drop_tree(topic_tree_name(&record.subscriber.topic))?;
        }
        Ok(())
    }
}

impl SubscriptionStore for SledStore {
    fn put(&self, subscriber: Subscriber) -> Result<(), StorageError> {
        let channels = self.channels()?;

        if let Some(raw) = channels.get(subscriber.channel.as_bytes())? {
            let existing: StoredRecord = serde_json::from_slice(&raw)?;
            if !self.is_expired(existing.registered_at) {
                return Err(StorageError::DuplicateChannel {
                    channel: subscriber.channel,
                });
            }
            self.remove_record(&existing)?;
        }

        let record = StoredRecord {
            seq: self.db.generate_id()?,
            registered_at: Utc::now().timestamp(),
            subscriber,
        };
        channels.insert(
            record.subscriber.channel.as_bytes(),
            serde_json::to_vec(&record)?,
        )?;
        self.topic_tree(&record.subscriber.topic)?.insert(
            record.seq.to_be_bytes(),
            record.subscriber.channel.as_bytes(),
        )?;
        Ok(())
    }

    fn get(&self, channel: &str) -> Result<Option<Subscriber>, StorageError> {
        match self.channels()?.get(channel.as_bytes())? {
            Some(raw) => {
                let record: StoredRecord = serde_json::from_slice(&raw)?;
                if self.is_expired(record.registered_at) {
                    self.remove_record(&record)?;
                    Ok(None)
                } else {
                    Ok(Some(record.subscriber))
                }
            }
            None => Ok(None),
        }
    }

    fn subscribers_by_topic(&self, topic: &str) -> Result<Vec<Subscriber>, StorageError> {
        let tree = self.topic_tree(topic)?;
        let channels = self.channels()?;

        let mut live = Vec::new();
        let mut dead = Vec::new();
        for item in tree.iter() {
            let (seq_key, channel_raw) = item?;
            match channels.get(&channel_raw)? {
                Some(raw) => {
                    let record: StoredRecord = serde_json::from_slice(&raw)?;
                    if self.is_expired(record.registered_at) {
                        dead.push((seq_key, Some(channel_raw)));
                    } else {
                        live.push(record.subscriber);
                    }
                }
                // Index entry whose record is gone; drop it.
                None => dead.push((seq_key, None)),
            }
        }

        for (seq_key, channel_raw) in dead {
            tree.remove(seq_key)?;
            if let Some(channel_raw) = channel_raw {
                channels.remove(channel_raw)?;
            }
        }
        if tree.is_empty() {
            self.db.drop_tree(topic_tree_name(topic))?;
        }
        Ok(live)
    }

    fn delete(&self, channel: &str) -> Result<(), StorageError> {
        if let Some(raw) = self.channels()?.get(channel.as_bytes())? {
            let record: StoredRecord = serde_json::from_slice(&raw)?;
            self.remove_record(&record)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for SledStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledStore")
            .field("db", &"sled::Db")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}
