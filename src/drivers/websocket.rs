use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_tungstenite::connect_async;
use tracing::{error, info};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::message::DeliveryPayload;
use crate::drivers::BroadcastDriver;
use crate::transport::message::ClientFrame;
use crate::utils::error::DeliveryError;

/// Push-service client: forwards every delivery to an external gateway over
/// one long-lived websocket connection.
///
/// The socket is owned by a spawned writer task; `send` only enqueues a
/// frame, so the broadcast pass never blocks on network I/O.
pub struct WebSocketDriver {
    tx: UnboundedSender<WsMessage>,
}

impl WebSocketDriver {
    /// Dials the push gateway and spawns the writer task that owns the
    /// connection.
    pub async fn connect(url: &str) -> Result<Self, DeliveryError> {
        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| DeliveryError::Connect(e.to_string()))?;
        let (mut ws_sender, _) = ws_stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

        let url = url.to_string();
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(e) = ws_sender.send(msg).await {
                    error!("Failed to push to {}: {}", url, e);
                    break;
                }
            }
            info!("Push connection to {} closed", url);
        });

        Ok(Self { tx })
    }
}

impl BroadcastDriver for WebSocketDriver {
    fn name(&self) -> &'static str {
        "websocket"
    }

    fn send(&self, channel: &str, payload: &DeliveryPayload) -> Result<(), DeliveryError> {
        let frame = ClientFrame::Publish {
            channel: channel.to_string(),
            payload: payload.clone(),
        };
        let text = serde_json::to_string(&frame)?;
        self.tx
            .send(WsMessage::text(text))
            .map_err(|_| DeliveryError::ChannelClosed)
    }
}

impl std::fmt::Debug for WebSocketDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketDriver").finish()
    }
}
