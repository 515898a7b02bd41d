use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::mpsc;
use tungstenite::protocol::Message as WsMessage;

use super::message::{ClientFrame, ServerFrame};
use super::websocket::{Gateway, handle_frame};
use crate::broker::engine::Broadcaster;
use crate::broker::filter::FilterRegistry;
use crate::broker::message::DeliveryPayload;
use crate::broker::registry::SubscriptionRegistry;
use crate::broker::topic::FieldTopicResolver;
use crate::drivers::LogDriver;
use crate::graphql::engine::ResolutionEngine;
use crate::graphql::executor::PassthroughExecutor;
use crate::graphql::response::Response;
use crate::storage::MemoryStore;

fn gateway() -> (Gateway, Arc<LogDriver>) {
    let store = Arc::new(MemoryStore::new(None));
    let topics = Arc::new(FieldTopicResolver);
    let log = Arc::new(LogDriver::new());
    let registry = SubscriptionRegistry::new(store.clone(), topics.clone());
    let broadcaster = Broadcaster::new(
        store,
        topics,
        FilterRegistry::new(),
        ResolutionEngine::new(Arc::new(PassthroughExecutor)),
        log.clone(),
    );
    (Gateway::new(registry, broadcaster, None), log)
}

fn next_frame(rx: &mut mpsc::UnboundedReceiver<WsMessage>) -> ServerFrame {
    let msg = rx.try_recv().expect("expected an outbound frame");
    serde_json::from_str(msg.to_text().unwrap()).unwrap()
}

#[test]
fn test_client_frames_parse() {
    let listen: ClientFrame =
        serde_json::from_str(r#"{ "type": "listen", "channel": "private-1" }"#).unwrap();
    assert!(matches!(listen, ClientFrame::Listen { channel } if channel == "private-1"));

    let subscribe: ClientFrame = serde_json::from_str(
        r#"{
            "type": "subscribe",
            "field_name": "onPostCreated",
            "query": "subscription { onPostCreated { body } }"
        }"#,
    )
    .unwrap();
    match subscribe {
        ClientFrame::Subscribe { request } => {
            assert_eq!(request.field_name, "onPostCreated");
            assert!(request.alias.is_none());
        }
        other => panic!("expected subscribe frame, got {other:?}"),
    }

    let broadcast: ClientFrame = serde_json::from_str(
        r#"{
            "type": "broadcast",
            "field_name": "onPostCreated",
            "root": { "body": "Foobar" }
        }"#,
    )
    .unwrap();
    match broadcast {
        ClientFrame::Broadcast { envelope } => {
            assert_eq!(envelope.field_name, "onPostCreated");
            assert!(!envelope.should_queue);
        }
        other => panic!("expected broadcast frame, got {other:?}"),
    }
}

#[test]
fn test_subscribe_frame_is_answered_with_ack() {
    let (gateway, _log) = gateway();
    let (tx, mut rx) = mpsc::unbounded_channel();

    handle_frame(
        &gateway,
        "conn-1",
        &tx,
        serde_json::from_value(json!({
            "type": "subscribe",
            "field_name": "onPostCreated",
            "query": "subscription { onPostCreated { body } }"
        }))
        .unwrap(),
    );

    match next_frame(&mut rx) {
        ServerFrame::Ack { ack } => {
            assert!(ack.channel("onPostCreated").is_some());
            assert_eq!(ack.data["onPostCreated"], Value::Null);
        }
        other => panic!("expected ack frame, got {other:?}"),
    }
}

#[test]
fn test_publish_frame_reaches_listeners() {
    let (gateway, _log) = gateway();
    let (tx, mut rx) = mpsc::unbounded_channel();

    handle_frame(
        &gateway,
        "conn-1",
        &tx,
        ClientFrame::Listen {
            channel: "private-abc".to_string(),
        },
    );
    let payload = DeliveryPayload::new("onPostCreated", Response::data(json!({ "body": "hi" })));
    handle_frame(
        &gateway,
        "conn-2",
        &tx,
        ClientFrame::Publish {
            channel: "private-abc".to_string(),
            payload: payload.clone(),
        },
    );

    match next_frame(&mut rx) {
        ServerFrame::Event {
            channel,
            payload: delivered,
        } => {
            assert_eq!(channel, "private-abc");
            assert_eq!(delivered, payload);
        }
        other => panic!("expected event frame, got {other:?}"),
    }
}

#[test]
fn test_publish_to_channel_without_listeners_is_silent() {
    let (gateway, _log) = gateway();
    let (tx, mut rx) = mpsc::unbounded_channel();

    handle_frame(
        &gateway,
        "conn-1",
        &tx,
        ClientFrame::Publish {
            channel: "private-nobody".to_string(),
            payload: DeliveryPayload::new("onPostCreated", Response::default()),
        },
    );
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_broadcast_frame_drives_the_engine() {
    let (gateway, log) = gateway();
    let (tx, mut rx) = mpsc::unbounded_channel();

    handle_frame(
        &gateway,
        "conn-1",
        &tx,
        serde_json::from_value(json!({
            "type": "subscribe",
            "field_name": "onPostCreated",
            "query": "subscription { onPostCreated { body } }"
        }))
        .unwrap(),
    );
    let ServerFrame::Ack { ack } = next_frame(&mut rx) else {
        panic!("expected ack frame");
    };
    let channel = ack.channel("onPostCreated").unwrap().to_string();

    handle_frame(
        &gateway,
        "conn-1",
        &tx,
        serde_json::from_value(json!({
            "type": "broadcast",
            "field_name": "onPostCreated",
            "root": { "body": "Foobar" }
        }))
        .unwrap(),
    );

    let deliveries = log.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].channel, channel);
    assert_eq!(
        deliveries[0].payload.field("onPostCreated"),
        Some(&json!({ "body": "Foobar" }))
    );
}

#[test]
fn test_unlisten_stops_routing_to_connection() {
    let (gateway, _log) = gateway();
    let (tx, mut rx) = mpsc::unbounded_channel();

    handle_frame(
        &gateway,
        "conn-1",
        &tx,
        ClientFrame::Listen {
            channel: "private-abc".to_string(),
        },
    );
    handle_frame(
        &gateway,
        "conn-1",
        &tx,
        ClientFrame::Unlisten {
            channel: "private-abc".to_string(),
        },
    );
    handle_frame(
        &gateway,
        "conn-2",
        &tx,
        ClientFrame::Publish {
            channel: "private-abc".to_string(),
            payload: DeliveryPayload::new("onPostCreated", Response::default()),
        },
    );
    assert!(rx.try_recv().is_err());
}
