use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::broker::topic::TopicResolver;
use crate::graphql::response::GraphqlError;
use crate::storage::SubscriptionStore;
use crate::subscriber::{SubscribeRequest, Subscriber};
use crate::utils::error::{StorageError, SubscribeError};

/// Protocol version advertised in subscribe acknowledgments.
pub const PROTOCOL_VERSION: u64 = 1;

/// The `extensions.lighthouse_subscriptions` block of an acknowledgment:
/// the channels the client must listen on via the out-of-band transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionsExtension {
    pub version: u64,
    pub channels: Map<String, Value>,
}

/// Extensions block sent alongside the initial subscribe response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckExtensions {
    pub lighthouse_subscriptions: SubscriptionsExtension,
}

/// Acknowledgment returned to the subscribing client over the normal
/// response channel. The subscription field resolves to `null` initially;
/// actual results arrive later, pushed to the advertised channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeAck {
    pub data: Value,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<AckExtensions>,
}

impl SubscribeAck {
    fn registered(subscriber: &Subscriber) -> Self {
        let name = subscriber.channel_name();
        let mut data = Map::new();
        data.insert(name.to_string(), Value::Null);
        let mut channels = Map::new();
        channels.insert(name.to_string(), Value::String(subscriber.channel.clone()));
        Self {
            data: Value::Object(data),
            errors: Vec::new(),
            extensions: Some(AckExtensions {
                lighthouse_subscriptions: SubscriptionsExtension {
                    version: PROTOCOL_VERSION,
                    channels,
                },
            }),
        }
    }

    fn failed(error: &SubscribeError) -> Self {
        Self {
            data: Value::Null,
            errors: vec![GraphqlError::new(error.to_string())],
            extensions: None,
        }
    }

    /// The advertised channel for `channel_name`, if registration succeeded.
    pub fn channel(&self, channel_name: &str) -> Option<&str> {
        self.extensions
            .as_ref()?
            .lighthouse_subscriptions
            .channels
            .get(channel_name)?
            .as_str()
    }
}

/// Registers and removes subscribers.
///
/// Subscribing mints the subscriber (fresh channel), derives its topic with
/// the same resolver the broadcaster uses, persists it, and builds the
/// acknowledgment for the client.
#[derive(Clone)]
pub struct SubscriptionRegistry {
    store: Arc<dyn SubscriptionStore>,
    topics: Arc<dyn TopicResolver>,
}

impl SubscriptionRegistry {
    pub fn new(store: Arc<dyn SubscriptionStore>, topics: Arc<dyn TopicResolver>) -> Self {
        Self { store, topics }
    }

    /// Registers one subscription operation.
    pub fn subscribe(&self, request: SubscribeRequest) -> Result<SubscribeAck, SubscribeError> {
        let topic = self.topics.topic_for(&request.field_name, &request.arguments);
        let subscriber = Subscriber::new(topic, request);
        let ack = SubscribeAck::registered(&subscriber);
        debug!(
            "Registered {} on topic {}",
            subscriber.channel, subscriber.topic
        );
        self.store.put(subscriber)?;
        Ok(ack)
    }

    /// Registers each operation of a batched request independently.
    ///
    /// The response array preserves request order; a failed registration
    /// becomes an error entry in its position instead of aborting the rest.
    pub fn subscribe_batch(&self, requests: Vec<SubscribeRequest>) -> Vec<SubscribeAck> {
        requests
            .into_iter()
            .map(|request| {
                self.subscribe(request)
                    .unwrap_or_else(|e| SubscribeAck::failed(&e))
            })
            .collect()
    }

    /// Removes a subscriber by channel. Unknown channels are a no-op.
    pub fn unsubscribe(&self, channel: &str) -> Result<(), StorageError> {
        self.store.delete(channel)
    }
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistry").finish()
    }
}
