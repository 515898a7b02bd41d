//! The `error` module defines custom error types used within the `lumen`
//! application.
//!
//! This module centralizes error handling, providing a consistent way to
//! represent and propagate errors throughout the system.
//!
//! Failures local to a single subscriber (filtering, resolution, delivery)
//! are modeled as separate kinds so the broadcast loop can record them
//! without aborting the fan-out for everyone else.

use thiserror::Error;

/// Errors raised by a subscription store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A live subscriber with this channel is already registered.
    #[error("channel '{channel}' is already registered")]
    DuplicateChannel { channel: String },

    /// The storage backend itself failed.
    #[error("storage backend error: {0}")]
    Backend(#[from] sled::Error),

    /// A subscriber record could not be encoded or decoded.
    #[error("subscriber record codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Registration failure surfaced to the subscribing caller.
#[derive(Debug, Error)]
pub enum SubscribeError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Error returned by an external selection executor.
///
/// Field-level errors belong inside the executor's `Response`; this type is
/// reserved for total failure of an execution.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExecutorError {
    pub message: String,
}

impl ExecutorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Total failure while re-resolving one subscriber's stored selection.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("selection executor failed: {0}")]
    Executor(#[from] ExecutorError),

    /// The captured request context could not be used for re-execution.
    #[error("stored context is unusable: {0}")]
    Context(String),
}

/// Failure delivering one payload to one channel address.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The driver's delivery channel is gone (writer task ended, socket closed).
    #[error("delivery channel is closed")]
    ChannelClosed,

    /// The driver could not reach its transport in the first place.
    #[error("failed to connect to push transport: {0}")]
    Connect(String),

    #[error("failed to encode delivery payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A filter predicate failed while deciding eligibility.
///
/// Treated as "do not broadcast to this subscriber", never fatal to the batch.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("filter predicate failed: {0}")]
    Predicate(String),
}

/// Failure that aborts an entire broadcast.
///
/// Only the initial topic lookup can abort a broadcast; every later failure
/// is isolated to the subscriber it concerns.
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
