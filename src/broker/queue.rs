use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{error, info};

use crate::broker::engine::Broadcaster;
use crate::broker::message::BroadcastEnvelope;

/// Spawns the deferred-broadcast worker and returns its inbox.
///
/// The worker drains queued envelopes outside the triggering request's
/// critical path and runs the same synchronous broadcast pass; outcomes are
/// logged here since no caller is waiting on them. It exits when the last
/// sender is dropped.
pub fn start(broadcaster: Broadcaster) -> UnboundedSender<BroadcastEnvelope> {
    let (tx, mut rx) = mpsc::unbounded_channel::<BroadcastEnvelope>();

    tokio::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            match broadcaster.broadcast(&envelope) {
                Ok(summary) => {
                    info!(
                        "Queued broadcast of {} delivered to {} subscriber(s), {} filtered, {} failed",
                        summary.topic,
                        summary.delivered,
                        summary.skipped,
                        summary.failures.len()
                    );
                }
                Err(e) => error!("Queued broadcast of {} failed: {}", envelope.field_name, e),
            }
        }
        info!("Broadcast queue worker stopped");
    });

    tx
}
