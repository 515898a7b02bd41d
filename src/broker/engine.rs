//! Broadcast engine
//!
//! This module contains the fan-out pass that turns one triggering event
//! into N personalized deliveries:
//! - derive the topic and load its subscribers in registration order
//! - gate each subscriber through the field's filter predicate
//! - re-resolve the stored selection against the event's root value
//! - hand the packaged payload to the active driver
//!
//! Failure discipline: anything that goes wrong for one subscriber (filter
//! error, resolution error, delivery error) is recorded in the returned
//! summary and the loop moves on. Only a storage failure during the initial
//! topic lookup aborts the broadcast. The triggering write has usually
//! already completed by the time this runs; broadcasting is fire-and-forget
//! relative to the write's own success.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::broker::filter::FilterRegistry;
use crate::broker::message::{BroadcastEnvelope, BroadcastFailure, DeliveryPayload};
use crate::broker::queue;
use crate::broker::topic::TopicResolver;
use crate::drivers::BroadcastDriver;
use crate::graphql::engine::ResolutionEngine;
use crate::storage::SubscriptionStore;
use crate::utils::error::BroadcastError;

/// Outcome of one broadcast: how many subscribers were delivered to,
/// how many were filtered out, and what failed for whom.
#[derive(Debug)]
pub struct BroadcastSummary {
    pub topic: String,
    pub delivered: usize,
    pub skipped: usize,
    pub failures: Vec<(String, BroadcastFailure)>,
}

impl BroadcastSummary {
    fn new(topic: String) -> Self {
        Self {
            topic,
            delivered: 0,
            skipped: 0,
            failures: Vec::new(),
        }
    }
}

/// Fans triggering events out to the subscribers of their topic.
///
/// Cloning is cheap; clones share the store, driver and queue. The public
/// API is synchronous: driver `send` only enqueues, network I/O lives in
/// driver-owned tasks, and no lock is held across storage or driver calls.
#[derive(Clone)]
pub struct Broadcaster {
    store: Arc<dyn SubscriptionStore>,
    topics: Arc<dyn TopicResolver>,
    filters: FilterRegistry,
    resolver: ResolutionEngine,
    driver: Arc<dyn BroadcastDriver>,
    queue: Option<UnboundedSender<BroadcastEnvelope>>,
}

impl Broadcaster {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        topics: Arc<dyn TopicResolver>,
        filters: FilterRegistry,
        resolver: ResolutionEngine,
        driver: Arc<dyn BroadcastDriver>,
    ) -> Self {
        Self {
            store,
            topics,
            filters,
            resolver,
            driver,
            queue: None,
        }
    }

    /// Spawns the deferred-broadcast worker and routes queued envelopes to
    /// it from now on. Must run inside a tokio runtime.
    pub fn with_queue(mut self) -> Self {
        // The worker broadcasts synchronously and never re-queues.
        self.queue = Some(queue::start(self.clone()));
        self
    }

    /// The active driver, so operational tooling and tests can inspect what
    /// was delivered.
    pub fn driver(&self) -> &Arc<dyn BroadcastDriver> {
        &self.driver
    }

    /// Entry point honoring the envelope's `should_queue` hint.
    ///
    /// Returns `None` when the envelope was handed to the queue worker. A
    /// queued envelope falls back to synchronous delivery when the worker
    /// is gone rather than dropping the event.
    pub fn publish(
        &self,
        envelope: BroadcastEnvelope,
    ) -> Result<Option<BroadcastSummary>, BroadcastError> {
        if envelope.should_queue {
            if let Some(tx) = &self.queue {
                match tx.send(envelope) {
                    Ok(()) => return Ok(None),
                    Err(returned) => {
                        warn!("Broadcast queue is gone, delivering synchronously");
                        return self.broadcast(&returned.0).map(Some);
                    }
                }
            }
        }
        self.broadcast(&envelope).map(Some)
    }

    /// Fans one event out to every eligible subscriber of its topic.
    ///
    /// A topic without subscribers is a no-op, not an error. Once the
    /// subscriber list is loaded there is no turning back: every matched
    /// subscriber gets an independent attempt to completion or failure.
    pub fn broadcast(
        &self,
        envelope: &BroadcastEnvelope,
    ) -> Result<BroadcastSummary, BroadcastError> {
        let topic = self
            .topics
            .topic_for(&envelope.field_name, &envelope.arguments);
        let subscribers = self.store.subscribers_by_topic(&topic)?;
        let mut summary = BroadcastSummary::new(topic);

        for subscriber in subscribers {
            match self.filters.should_broadcast(&subscriber, &envelope.root) {
                Ok(true) => {}
                Ok(false) => {
                    debug!("Filtered {} out of {}", subscriber.channel, summary.topic);
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!("Filter failed for {}: {}", subscriber.channel, e);
                    summary
                        .failures
                        .push((subscriber.channel, BroadcastFailure::Filter(e)));
                    continue;
                }
            }

            let response = match self.resolver.resolve(&subscriber, &envelope.root) {
                Ok(response) => response,
                Err(e) => {
                    warn!("Resolution failed for {}: {}", subscriber.channel, e);
                    summary
                        .failures
                        .push((subscriber.channel, BroadcastFailure::Resolution(e)));
                    continue;
                }
            };

            let payload = DeliveryPayload::new(subscriber.channel_name(), response);
            match self.driver.send(&subscriber.channel, &payload) {
                Ok(()) => {
                    debug!("Delivered {} to {}", summary.topic, subscriber.channel);
                    summary.delivered += 1;
                }
                Err(e) => {
                    warn!("Delivery failed for {}: {}", subscriber.channel, e);
                    summary
                        .failures
                        .push((subscriber.channel, BroadcastFailure::Delivery(e)));
                }
            }
        }

        Ok(summary)
    }
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("driver", &self.driver.name())
            .field("queued", &self.queue.is_some())
            .finish()
    }
}
