use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_tungstenite::accept_async;
use tracing::{error, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::engine::Broadcaster;
use crate::broker::message::DeliveryPayload;
use crate::broker::registry::SubscriptionRegistry;
use crate::drivers::channel::ChannelDriver;
use crate::transport::message::{ClientFrame, ServerFrame};

#[derive(Debug, Clone)]
struct Listener {
    conn_id: String,
    tx: UnboundedSender<WsMessage>,
}

/// Which connections listen on which channels.
#[derive(Debug, Default)]
pub(crate) struct ListenerTable {
    channels: DashMap<String, Vec<Listener>>,
}

impl ListenerTable {
    fn listen(&self, channel: &str, conn_id: &str, tx: UnboundedSender<WsMessage>) {
        let mut slot = self.channels.entry(channel.to_string()).or_default();
        if !slot.iter().any(|l| l.conn_id == conn_id) {
            slot.push(Listener {
                conn_id: conn_id.to_string(),
                tx,
            });
        }
    }

    fn unlisten(&self, channel: &str, conn_id: &str) {
        if let Entry::Occupied(mut slot) = self.channels.entry(channel.to_string()) {
            slot.get_mut().retain(|l| l.conn_id != conn_id);
            if slot.get().is_empty() {
                slot.remove();
            }
        }
    }

    fn drop_connection(&self, conn_id: &str) {
        self.channels.retain(|_, listeners| {
            listeners.retain(|l| l.conn_id != conn_id);
            !listeners.is_empty()
        });
    }

    /// Forwards one delivery to every connection listening on its channel.
    fn route(&self, channel: &str, payload: &DeliveryPayload) {
        let Some(listeners) = self.channels.get(channel) else {
            return;
        };
        let frame = ServerFrame::Event {
            channel: channel.to_string(),
            payload: payload.clone(),
        };
        let text = match serde_json::to_string(&frame) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to serialize event frame: {:?}", e);
                return;
            }
        };
        for listener in listeners.iter() {
            if listener.tx.send(WsMessage::text(text.clone())).is_err() {
                warn!("Listener {} is gone for {}", listener.conn_id, channel);
            }
        }
    }
}

/// One gateway instance: the subscription surface, the broadcaster behind
/// it, and the listener table events are routed through.
///
/// `bus` carries the channel driver whose events this gateway forwards;
/// pass `None` when the engine delivers through another driver and the
/// gateway only serves `publish` frames from remote engines.
#[derive(Clone)]
pub struct Gateway {
    registry: SubscriptionRegistry,
    broadcaster: Broadcaster,
    bus: Option<ChannelDriver>,
    listeners: Arc<ListenerTable>,
}

impl Gateway {
    pub fn new(
        registry: SubscriptionRegistry,
        broadcaster: Broadcaster,
        bus: Option<ChannelDriver>,
    ) -> Self {
        Self {
            registry,
            broadcaster,
            bus,
            listeners: Arc::new(ListenerTable::default()),
        }
    }
}

/// Accepts websocket connections and serves them until the listener dies.
pub async fn start_gateway(addr: &str, gateway: Gateway) {
    let listener = TcpListener::bind(addr).await.expect("Can't bind");

    info!("Subscription gateway listening on ws://{}", addr);

    if let Some(bus) = gateway.bus.clone() {
        let listeners = gateway.listeners.clone();
        spawn(pump_bus(bus, listeners));
    }

    while let Ok((stream, _)) = listener.accept().await {
        let gateway = gateway.clone();
        let conn_id = format!("conn-{}", uuid::Uuid::new_v4());
        tokio::spawn(handle_connection(stream, gateway, conn_id));
    }
}

/// Forwards every bus event to the listeners of its channel.
async fn pump_bus(bus: ChannelDriver, listeners: Arc<ListenerTable>) {
    let mut events = bus.subscribe();
    loop {
        match events.recv().await {
            Ok(event) => listeners.route(&event.channel, &event.payload),
            Err(RecvError::Lagged(n)) => warn!("Bus receiver lagged, dropped {} event(s)", n),
            Err(RecvError::Closed) => break,
        }
    }
}

async fn handle_connection(stream: TcpStream, gateway: Gateway, conn_id: String) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            error!("WebSocket handshake error: {}", e);
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Channel for frames going out to this connection
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

    // Forward outbound frames to the socket
    let send_conn_id = conn_id.clone();
    spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = ws_sender.send(msg).await {
                warn!("Failed to send to {}: {}", send_conn_id, e);
                break;
            }
        }
    });

    while let Some(Ok(msg)) = ws_receiver.next().await {
        if !msg.is_text() {
            continue;
        }
        let Ok(text) = msg.to_text() else { continue };
        match serde_json::from_str::<ClientFrame>(text) {
            Ok(frame) => handle_frame(&gateway, &conn_id, &tx, frame),
            Err(err) => {
                warn!("Invalid client frame from {}: {} | {}", conn_id, err, text);
                reply(
                    &tx,
                    &ServerFrame::Error {
                        message: format!("invalid frame: {err}"),
                    },
                );
            }
        }
    }

    info!("{} disconnected", conn_id);
    gateway.listeners.drop_connection(&conn_id);
}

/// Applies one client frame against the gateway state. Replies, if any, go
/// through the connection's outbound channel.
pub(crate) fn handle_frame(
    gateway: &Gateway,
    conn_id: &str,
    tx: &UnboundedSender<WsMessage>,
    frame: ClientFrame,
) {
    match frame {
        ClientFrame::Listen { channel } => {
            gateway.listeners.listen(&channel, conn_id, tx.clone());
            info!("{} listening on {}", conn_id, channel);
        }

        ClientFrame::Unlisten { channel } => {
            gateway.listeners.unlisten(&channel, conn_id);
        }

        ClientFrame::Subscribe { request } => match gateway.registry.subscribe(request) {
            Ok(ack) => reply(tx, &ServerFrame::Ack { ack }),
            Err(e) => reply(
                tx,
                &ServerFrame::Error {
                    message: e.to_string(),
                },
            ),
        },

        ClientFrame::Unsubscribe { channel } => {
            gateway.listeners.unlisten(&channel, conn_id);
            if let Err(e) = gateway.registry.unsubscribe(&channel) {
                reply(
                    tx,
                    &ServerFrame::Error {
                        message: e.to_string(),
                    },
                );
            }
        }

        ClientFrame::Broadcast { envelope } => {
            let field_name = envelope.field_name.clone();
            match gateway.broadcaster.publish(envelope) {
                Ok(Some(summary)) => info!(
                    "Broadcast of {} delivered to {} subscriber(s)",
                    summary.topic, summary.delivered
                ),
                Ok(None) => {}
                Err(e) => {
                    error!("Broadcast of {} failed: {}", field_name, e);
                    reply(
                        tx,
                        &ServerFrame::Error {
                            message: e.to_string(),
                        },
                    );
                }
            }
        }

        ClientFrame::Publish { channel, payload } => {
            gateway.listeners.route(&channel, &payload);
        }
    }
}

fn reply(tx: &UnboundedSender<WsMessage>, frame: &ServerFrame) {
    match serde_json::to_string(frame) {
        Ok(text) => {
            let _ = tx.send(WsMessage::text(text));
        }
        Err(e) => error!("Failed to serialize server frame: {:?}", e),
    }
}
