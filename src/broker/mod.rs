//! The `broker` module is the core of the subscription engine.
//!
//! It registers subscribers (`registry`), derives the topic an event lands
//! on (`topic`), gates per-subscriber eligibility (`filter`), and fans one
//! triggering event out into N personalized deliveries (`engine`), with an
//! optional deferred worker for queued broadcasts (`queue`).

pub mod engine;
pub mod filter;
pub mod message;
pub mod queue;
pub mod registry;
pub mod topic;

pub use engine::{BroadcastSummary, Broadcaster};
pub use filter::FilterRegistry;
pub use message::{BroadcastEnvelope, DeliveryPayload};
pub use registry::{SubscribeAck, SubscriptionRegistry};
pub use topic::{FieldTopicResolver, TopicResolver};
