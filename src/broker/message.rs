use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::graphql::response::{GraphqlError, Response};
use crate::utils::error::{DeliveryError, FilterError, ResolutionError};

/// The triggering event handed to the broadcaster.
///
/// `should_queue` hints that delivery may be deferred to the queue worker
/// instead of running on the triggering request's critical path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastEnvelope {
    /// The subscription field the event belongs to (e.g. `onPostCreated`).
    pub field_name: String,

    /// The data produced by the triggering write.
    pub root: Value,

    /// Trigger-time argument values, passed through to the topic resolver.
    #[serde(default)]
    pub arguments: Value,

    #[serde(default)]
    pub should_queue: bool,
}

impl BroadcastEnvelope {
    pub fn new(field_name: impl Into<String>, root: Value) -> Self {
        Self {
            field_name: field_name.into(),
            root,
            arguments: Value::Null,
            should_queue: false,
        }
    }

    pub fn queued(mut self) -> Self {
        self.should_queue = true;
        self
    }
}

/// One subscriber's personalized delivery, mirroring the standard query
/// response shape and scoped to that subscriber alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPayload {
    /// `{ <fieldNameOrAlias>: <resolvedValueOrNull> }`
    pub data: Value,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,
}

impl DeliveryPayload {
    /// Packages a resolved response under the subscriber's channel name.
    pub fn new(channel_name: &str, response: Response) -> Self {
        let mut data = Map::new();
        data.insert(channel_name.to_string(), response.data);
        Self {
            data: Value::Object(data),
            errors: response.errors,
        }
    }

    /// The resolved value delivered under `channel_name`, if present.
    pub fn field(&self, channel_name: &str) -> Option<&Value> {
        self.data.get(channel_name)
    }
}

/// Why one subscriber missed one broadcast. Always isolated: recording a
/// failure never aborts the remaining fan-out.
#[derive(Debug)]
pub enum BroadcastFailure {
    Filter(FilterError),
    Resolution(ResolutionError),
    Delivery(DeliveryError),
}
