use serde::{Deserialize, Serialize};

use crate::broker::message::{BroadcastEnvelope, DeliveryPayload};
use crate::broker::registry::SubscribeAck;
use crate::subscriber::SubscribeRequest;

/// Frames a connected client may send to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientFrame {
    /// Start receiving events pushed to `channel`.
    #[serde(rename = "listen")]
    Listen { channel: String },

    #[serde(rename = "unlisten")]
    Unlisten { channel: String },

    /// Register a subscription operation; answered with an `ack` frame.
    #[serde(rename = "subscribe")]
    Subscribe {
        #[serde(flatten)]
        request: SubscribeRequest,
    },

    #[serde(rename = "unsubscribe")]
    Unsubscribe { channel: String },

    /// A completed write operation reporting its result for fan-out.
    #[serde(rename = "broadcast")]
    Broadcast {
        #[serde(flatten)]
        envelope: BroadcastEnvelope,
    },

    /// A remote engine publishing one already-resolved delivery
    /// (what the websocket driver sends).
    #[serde(rename = "publish")]
    Publish {
        channel: String,
        payload: DeliveryPayload,
    },
}

/// Frames the gateway sends to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerFrame {
    /// Answer to a `subscribe` frame.
    #[serde(rename = "ack")]
    Ack {
        #[serde(flatten)]
        ack: SubscribeAck,
    },

    /// A delivery for a channel this client listens on.
    #[serde(rename = "event")]
    Event {
        channel: String,
        payload: DeliveryPayload,
    },

    #[serde(rename = "error")]
    Error { message: String },
}
