use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A client's request to register one subscription operation.
///
/// Everything in here is captured at subscribe time: the later broadcast
/// pass runs against this state alone, never against the original request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeRequest {
    /// The subscription field the client selected (e.g. `onPostCreated`).
    pub field_name: String,

    /// The client's query alias for the field, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// The serialized query document, re-executable without the request.
    pub query: String,

    /// Field argument values, read later by broadcast filters.
    #[serde(default)]
    pub arguments: Value,

    /// Operation variables, used during re-resolution.
    #[serde(default)]
    pub variables: Map<String, Value>,

    /// Serializable request-context snapshot (e.g. acting user identity).
    /// Must hold reconstructible data only, never live handles.
    #[serde(default)]
    pub context: Value,
}

/// Persisted snapshot of one client's subscription intent.
///
/// Immutable after creation: any change of interest requires an unsubscribe
/// followed by a fresh subscribe, which mints a new channel. The canonical
/// record is owned by the store; everything else works on copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Globally unique opaque delivery address, never reused.
    pub channel: String,

    /// The event name this subscriber listens to (derived, not client-supplied).
    pub topic: String,

    pub field_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    pub selection_set: String,

    #[serde(default)]
    pub arguments: Value,

    #[serde(default)]
    pub variables: Map<String, Value>,

    #[serde(default)]
    pub context: Value,
}

impl Subscriber {
    /// Mints a subscriber for `topic` from a subscribe request, generating
    /// its unique channel.
    pub fn new(topic: impl Into<String>, request: SubscribeRequest) -> Self {
        Self {
            channel: format!("private-{}", Uuid::new_v4()),
            topic: topic.into(),
            field_name: request.field_name,
            alias: request.alias,
            selection_set: request.query,
            arguments: request.arguments,
            variables: request.variables,
            context: request.context,
        }
    }

    /// The key this subscriber's results are published under: the client's
    /// alias if present, else the field name.
    pub fn channel_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.field_name)
    }
}
