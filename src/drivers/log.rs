use std::sync::Mutex;

use tracing::info;

use crate::broker::message::DeliveryPayload;
use crate::drivers::BroadcastDriver;
use crate::utils::error::DeliveryError;

/// One recorded delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub channel: String,
    pub payload: DeliveryPayload,
}

/// Driver for tests and local development: logs every delivery and keeps
/// them all in memory, in send order, for inspection.
#[derive(Debug, Default)]
pub struct LogDriver {
    deliveries: Mutex<Vec<Delivery>>,
}

impl LogDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delivery made so far, oldest first.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }
}

impl BroadcastDriver for LogDriver {
    fn name(&self) -> &'static str {
        "log"
    }

    fn send(&self, channel: &str, payload: &DeliveryPayload) -> Result<(), DeliveryError> {
        info!("delivering to {}: {:?}", channel, payload);
        self.deliveries.lock().unwrap().push(Delivery {
            channel: channel.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }
}
