use super::{MemoryStore, SledStore, SubscriptionStore};
use crate::subscriber::{SubscribeRequest, Subscriber};
use crate::utils::error::StorageError;

use std::thread::sleep;
use std::time::Duration;
use tempfile::tempdir;

fn subscriber(topic: &str) -> Subscriber {
    Subscriber::new(
        topic,
        SubscribeRequest {
            field_name: "onPostCreated".to_string(),
            alias: None,
            query: "subscription { onPostCreated { body } }".to_string(),
            arguments: serde_json::Value::Null,
            variables: serde_json::Map::new(),
            context: serde_json::Value::Null,
        },
    )
}

fn create_sled_store(ttl: Option<i64>) -> (SledStore, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let store = SledStore::new(dir.path().to_str().unwrap(), ttl).unwrap();
    (store, dir)
}

#[test]
fn test_put_and_get_roundtrip() {
    let store = MemoryStore::new(None);
    let sub = subscriber("ON_POST_CREATED");
    let channel = sub.channel.clone();

    store.put(sub.clone()).unwrap();
    assert_eq!(store.get(&channel).unwrap(), Some(sub));
    assert_eq!(store.get("private-unknown").unwrap(), None);
}

#[test]
fn test_duplicate_channel_is_rejected() {
    let store = MemoryStore::new(None);
    let sub = subscriber("ON_POST_CREATED");

    store.put(sub.clone()).unwrap();
    match store.put(sub.clone()) {
        Err(StorageError::DuplicateChannel { channel }) => assert_eq!(channel, sub.channel),
        other => panic!("expected DuplicateChannel, got {other:?}"),
    }
}

#[test]
fn test_subscribers_by_topic_keeps_registration_order() {
    let store = MemoryStore::new(None);
    let subs: Vec<Subscriber> = (0..5).map(|_| subscriber("ON_POST_CREATED")).collect();
    for sub in &subs {
        store.put(sub.clone()).unwrap();
    }

    let listed = store.subscribers_by_topic("ON_POST_CREATED").unwrap();
    let channels: Vec<_> = listed.iter().map(|s| s.channel.as_str()).collect();
    let expected: Vec<_> = subs.iter().map(|s| s.channel.as_str()).collect();
    assert_eq!(channels, expected);

    assert!(store.subscribers_by_topic("ON_NOTHING").unwrap().is_empty());
}

#[test]
fn test_delete_is_idempotent_and_clears_topic_index() {
    let store = MemoryStore::new(None);
    let sub = subscriber("ON_POST_CREATED");
    let channel = sub.channel.clone();
    store.put(sub).unwrap();

    store.delete(&channel).unwrap();
    assert_eq!(store.get(&channel).unwrap(), None);
    assert!(
        store
            .subscribers_by_topic("ON_POST_CREATED")
            .unwrap()
            .is_empty()
    );

    // Deleting again is a no-op, not an error.
    store.delete(&channel).unwrap();
}

#[test]
fn test_delete_leaves_other_subscribers_of_topic() {
    let store = MemoryStore::new(None);
    let first = subscriber("ON_POST_CREATED");
    let second = subscriber("ON_POST_CREATED");
    store.put(first.clone()).unwrap();
    store.put(second.clone()).unwrap();

    store.delete(&first.channel).unwrap();
    let listed = store.subscribers_by_topic("ON_POST_CREATED").unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].channel, second.channel);
}

#[test]
fn test_memory_ttl_expires_subscribers() {
    let store = MemoryStore::new(Some(1));
    let sub = subscriber("TTL_TOPIC");
    let channel = sub.channel.clone();
    store.put(sub).unwrap();

    sleep(Duration::from_secs(2)); // Wait so the TTL expires
    assert_eq!(store.get(&channel).unwrap(), None);
    assert!(store.subscribers_by_topic("TTL_TOPIC").unwrap().is_empty());
}

#[test]
fn test_sled_put_get_delete() {
    let (store, _dir) = create_sled_store(None);
    let sub = subscriber("ON_POST_CREATED");
    let channel = sub.channel.clone();

    store.put(sub.clone()).unwrap();
    assert_eq!(store.get(&channel).unwrap(), Some(sub.clone()));

    match store.put(sub) {
        Err(StorageError::DuplicateChannel { .. }) => {}
        other => panic!("expected DuplicateChannel, got {other:?}"),
    }

    store.delete(&channel).unwrap();
    assert_eq!(store.get(&channel).unwrap(), None);
    assert!(
        store
            .subscribers_by_topic("ON_POST_CREATED")
            .unwrap()
            .is_empty()
    );
    store.delete(&channel).unwrap();
}

#[test]
fn test_sled_registration_order_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().to_str().unwrap().to_string();
    let subs: Vec<Subscriber> = (0..4).map(|_| subscriber("ON_POST_CREATED")).collect();

    {
        let store = SledStore::new(&path, None).unwrap();
        for sub in &subs {
            store.put(sub.clone()).unwrap();
        }
    }

    // A different process picks up where the registering one left off.
    let store = SledStore::new(&path, None).unwrap();
    let listed = store.subscribers_by_topic("ON_POST_CREATED").unwrap();
    let channels: Vec<_> = listed.iter().map(|s| s.channel.as_str()).collect();
    let expected: Vec<_> = subs.iter().map(|s| s.channel.as_str()).collect();
    assert_eq!(channels, expected);
}

#[test]
fn test_sled_ttl_removes_expired_subscribers() {
    let (store, _dir) = create_sled_store(Some(1));
    let sub = subscriber("TTL_TOPIC");
    store.put(sub).unwrap();

    sleep(Duration::from_secs(2)); // Wait so the TTL expires
    assert!(store.subscribers_by_topic("TTL_TOPIC").unwrap().is_empty());
}

#[test]
fn test_concurrent_puts_to_same_topic_lose_nothing() {
    use std::sync::Arc;

    let store = Arc::new(MemoryStore::new(None));
    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        handles.push(std::thread::spawn(move || {
            for _ in 0..25 {
                store.put(subscriber("BUSY_TOPIC")).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.subscribers_by_topic("BUSY_TOPIC").unwrap().len(), 200);
}
