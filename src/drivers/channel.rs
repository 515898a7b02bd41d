use tokio::sync::broadcast;

use crate::broker::message::DeliveryPayload;
use crate::drivers::BroadcastDriver;
use crate::utils::error::DeliveryError;

/// One delivery published on the in-process bus, keyed by its channel.
#[derive(Debug, Clone)]
pub struct ChannelEvent {
    pub channel: String,
    pub payload: DeliveryPayload,
}

/// Publishes deliveries onto an in-process bus for transports to pick up.
///
/// The websocket gateway subscribes to the bus and forwards each event to
/// the connections listening on its channel. Cloning the driver clones a
/// handle to the same bus.
#[derive(Debug, Clone)]
pub struct ChannelDriver {
    bus: broadcast::Sender<ChannelEvent>,
}

impl ChannelDriver {
    pub fn new(capacity: usize) -> Self {
        let (bus, _) = broadcast::channel(capacity);
        Self { bus }
    }

    /// A fresh bus subscription; sees every event sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.bus.subscribe()
    }
}

impl Default for ChannelDriver {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl BroadcastDriver for ChannelDriver {
    fn name(&self) -> &'static str {
        "channel"
    }

    fn send(&self, channel: &str, payload: &DeliveryPayload) -> Result<(), DeliveryError> {
        // A bus without listeners is not a delivery failure; transports may
        // attach after the engine starts broadcasting.
        let _ = self.bus.send(ChannelEvent {
            channel: channel.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }
}
