use serde_json::json;

use super::channel::ChannelDriver;
use super::log::LogDriver;
use super::{BroadcastDriver, websocket::WebSocketDriver};
use crate::broker::message::DeliveryPayload;
use crate::graphql::response::Response;
use crate::transport::message::ClientFrame;

fn payload(body: &str) -> DeliveryPayload {
    DeliveryPayload::new("onPostCreated", Response::data(json!({ "body": body })))
}

#[test]
fn test_log_driver_accumulates_in_send_order() {
    let driver = LogDriver::new();
    driver.send("private-1", &payload("first")).unwrap();
    driver.send("private-2", &payload("second")).unwrap();

    let deliveries = driver.deliveries();
    assert_eq!(deliveries.len(), 2);
    assert_eq!(deliveries[0].channel, "private-1");
    assert_eq!(deliveries[1].channel, "private-2");
    assert_eq!(
        deliveries[0].payload.field("onPostCreated"),
        Some(&json!({ "body": "first" }))
    );
}

#[tokio::test]
async fn test_channel_driver_publishes_to_bus_subscribers() {
    let driver = ChannelDriver::new(16);
    let mut events = driver.subscribe();

    driver.send("private-1", &payload("hello")).unwrap();

    let event = events.recv().await.unwrap();
    assert_eq!(event.channel, "private-1");
    assert_eq!(
        event.payload.field("onPostCreated"),
        Some(&json!({ "body": "hello" }))
    );
}

#[test]
fn test_channel_driver_without_listeners_still_succeeds() {
    let driver = ChannelDriver::new(16);
    driver.send("private-1", &payload("nobody home")).unwrap();
}

#[tokio::test]
async fn test_websocket_driver_pushes_publish_frames() {
    use futures_util::StreamExt;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // A stand-in push gateway that records the first frame it receives.
    let served = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let msg = ws.next().await.unwrap().unwrap();
        msg.to_text().unwrap().to_string()
    });

    let driver = WebSocketDriver::connect(&format!("ws://{addr}"))
        .await
        .unwrap();
    driver.send("private-1", &payload("pushed")).unwrap();

    let received = served.await.unwrap();
    let frame: ClientFrame = serde_json::from_str(&received).unwrap();
    match frame {
        ClientFrame::Publish { channel, payload } => {
            assert_eq!(channel, "private-1");
            assert_eq!(
                payload.field("onPostCreated"),
                Some(&json!({ "body": "pushed" }))
            );
        }
        other => panic!("expected publish frame, got {other:?}"),
    }
}
