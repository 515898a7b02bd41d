//! The `subscriber` module defines the representation of a subscriber in the
//! broadcast system.
//!
//! It provides the `Subscriber` struct, the persisted snapshot of a single
//! client's subscription intent, and the `SubscribeRequest` it is minted
//! from. A subscriber is a flat serializable record so it can cross process
//! boundaries through any storage backend.

pub mod record;
pub use record::{SubscribeRequest, Subscriber};
