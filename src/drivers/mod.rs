//! The `drivers` module abstracts how a resolved payload reaches a channel
//! address.
//!
//! One driver is active per deployment, selected through configuration, and
//! every subscriber of a broadcast goes through the same one. Drivers do
//! not retry; retry policy, if any, is layered above `send` by the
//! deployment.

pub mod channel;
pub mod log;
pub mod websocket;

pub use channel::{ChannelDriver, ChannelEvent};
pub use log::{Delivery, LogDriver};
pub use websocket::WebSocketDriver;

use crate::broker::message::DeliveryPayload;
use crate::utils::error::DeliveryError;

/// Delivers one encoded payload to one channel address.
pub trait BroadcastDriver: Send + Sync {
    /// The configuration name this driver is selected by.
    fn name(&self) -> &'static str;

    fn send(&self, channel: &str, payload: &DeliveryPayload) -> Result<(), DeliveryError>;
}

#[cfg(test)]
mod tests;
