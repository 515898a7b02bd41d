//! The `transport` module is the out-of-band delivery side of the system:
//! a websocket gateway clients connect to with the channel they were handed
//! at subscribe time.
//!
//! It defines the wire frames exchanged with clients, and the gateway
//! itself: connections `listen` on channels, the gateway forwards every bus
//! event from the channel driver (or `publish` frame from a remote engine)
//! to the matching listeners. In standalone broker mode the same connection
//! can also register subscriptions and trigger broadcasts.

pub mod message;
pub mod websocket;

pub use websocket::{Gateway, start_gateway};

#[cfg(test)]
mod tests;
