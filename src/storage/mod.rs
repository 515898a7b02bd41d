//! The `storage` module provides mechanisms for storing and retrieving
//! subscribers.
//!
//! Subscribe and broadcast happen in different requests, possibly different
//! processes, so subscriber state lives behind the `SubscriptionStore`
//! abstraction: an in-process map for single-node deployments and tests,
//! and `sled` as an embedded key-value store when registrations must
//! survive across processes on one host.

pub mod memory;
pub mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledStore;

use crate::subscriber::Subscriber;
use crate::utils::error::StorageError;

/// Durable mapping of topics to subscribers and channels to subscribers.
///
/// Stores own the canonical `Subscriber` records; callers only ever receive
/// copies. A backend may expire records after a TTL to bound growth from
/// abandoned connections; expiry is invisible to callers, expired entries
/// simply behave as absent.
pub trait SubscriptionStore: Send + Sync {
    /// Persists a subscriber, indexed by its unique channel and its topic.
    ///
    /// Fails with [`StorageError::DuplicateChannel`] when a live subscriber
    /// already holds the channel.
    fn put(&self, subscriber: Subscriber) -> Result<(), StorageError>;

    /// Exact lookup by channel. Absent and expired look the same: `None`.
    fn get(&self, channel: &str) -> Result<Option<Subscriber>, StorageError>;

    /// All live subscribers of a topic, in registration order.
    fn subscribers_by_topic(&self, topic: &str) -> Result<Vec<Subscriber>, StorageError>;

    /// Idempotent removal from both indexes. Removing a topic's last
    /// subscriber also clears the topic index entry.
    fn delete(&self, channel: &str) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests;
