use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::storage::SubscriptionStore;
use crate::subscriber::Subscriber;
use crate::utils::error::StorageError;

#[derive(Debug, Clone)]
struct StoredEntry {
    subscriber: Subscriber,
    registered_at: i64,
}

impl StoredEntry {
    fn new(subscriber: Subscriber) -> Self {
        Self {
            subscriber,
            registered_at: Utc::now().timestamp(),
        }
    }
}

/// In-process subscription store for single-node deployments and tests.
///
/// Backed by sharded concurrent maps so unrelated topics never contend on
/// one lock. The topic index keeps channels in insertion order. Entries
/// past the optional TTL behave as absent and are purged lazily on reads
/// that touch them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    channels: DashMap<String, StoredEntry>,
    topics: DashMap<String, Vec<String>>,
    ttl_seconds: Option<i64>,
}

impl MemoryStore {
    pub fn new(ttl_seconds: Option<i64>) -> Self {
        Self {
            channels: DashMap::new(),
            topics: DashMap::new(),
            ttl_seconds,
        }
    }

    fn is_expired(&self, registered_at: i64) -> bool {
        match self.ttl_seconds {
            Some(ttl) => Utc::now().timestamp() - registered_at >= ttl,
            None => false,
        }
    }

    /// Drops `channel` from a topic's index, clearing the topic entry when
    /// it was the last one.
    fn unindex(&self, topic: &str, channel: &str) {
        if let Entry::Occupied(mut slot) = self.topics.entry(topic.to_string()) {
            slot.get_mut().retain(|c| c != channel);
            if slot.get().is_empty() {
                slot.remove();
            }
        }
    }
}

impl SubscriptionStore for MemoryStore {
    fn put(&self, subscriber: Subscriber) -> Result<(), StorageError> {
        let channel = subscriber.channel.clone();
        let topic = subscriber.topic.clone();

        // Claim the channel slot first; the stale topic (if an expired entry
        // is being replaced) is unindexed only after the slot lock is gone,
        // so no thread ever holds locks on both maps at once.
        let stale_topic = match self.channels.entry(channel.clone()) {
            Entry::Occupied(mut slot) => {
                if !self.is_expired(slot.get().registered_at) {
                    return Err(StorageError::DuplicateChannel { channel });
                }
                let stale = slot.get().subscriber.topic.clone();
                slot.insert(StoredEntry::new(subscriber));
                Some(stale)
            }
            Entry::Vacant(slot) => {
                slot.insert(StoredEntry::new(subscriber));
                None
            }
        };

        if let Some(stale) = stale_topic {
            self.unindex(&stale, &channel);
        }
        self.topics.entry(topic).or_default().push(channel);
        Ok(())
    }

    fn get(&self, channel: &str) -> Result<Option<Subscriber>, StorageError> {
        let expired = match self.channels.get(channel) {
            Some(entry) => {
                if !self.is_expired(entry.registered_at) {
                    return Ok(Some(entry.subscriber.clone()));
                }
                true
            }
            None => false,
        };

        if expired {
            self.delete(channel)?;
        }
        Ok(None)
    }

    fn subscribers_by_topic(&self, topic: &str) -> Result<Vec<Subscriber>, StorageError> {
        let channels: Vec<String> = match self.topics.get(topic) {
            Some(list) => list.clone(),
            None => return Ok(Vec::new()),
        };

        let mut live = Vec::with_capacity(channels.len());
        let mut dead = Vec::new();
        for channel in channels {
            match self.channels.get(&channel) {
                Some(entry) if !self.is_expired(entry.registered_at) => {
                    live.push(entry.subscriber.clone());
                }
                _ => dead.push(channel),
            }
        }

        for channel in dead {
            self.channels.remove(&channel);
            self.unindex(topic, &channel);
        }
        Ok(live)
    }

    fn delete(&self, channel: &str) -> Result<(), StorageError> {
        if let Some((_, entry)) = self.channels.remove(channel) {
            self.unindex(&entry.subscriber.topic, channel);
        }
        Ok(())
    }
}
