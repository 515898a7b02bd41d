//! CLI for lumen
//!
//! Subcommands:
//! - `gateway`: run the websocket delivery gateway
//! - `client`: run a smoke-test client (subscribe, listen, broadcast, print the pushed event)

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use lumen::broker::engine::Broadcaster;
use lumen::broker::filter::FilterRegistry;
use lumen::broker::registry::SubscriptionRegistry;
use lumen::broker::topic::FieldTopicResolver;
use lumen::config::{BroadcastSettings, StorageSettings, load_config};
use lumen::drivers::{BroadcastDriver, ChannelDriver, LogDriver, WebSocketDriver};
use lumen::graphql::engine::ResolutionEngine;
use lumen::graphql::executor::PassthroughExecutor;
use lumen::storage::{MemoryStore, SledStore, SubscriptionStore};
use lumen::transport::{Gateway, start_gateway};

#[derive(Parser)]
#[command(name = "lumen")]
enum Command {
    /// Start the websocket delivery gateway
    Gateway,
    /// Run the example client (connects, subscribes, listens, triggers a broadcast)
    Client {
        /// Gateway URL to connect to (default: ws://127.0.0.1:8080)
        #[arg(long, default_value = "ws://127.0.0.1:8080")]
        url: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    lumen::utils::logging::init("info");

    let cmd = Command::parse();

    match cmd {
        Command::Gateway => {
            if let Err(e) = run_gateway().await {
                error!("Gateway failed: {}", e);
            }
        }
        Command::Client { url } => {
            if let Err(e) = run_client(&url).await {
                error!("Client failed: {}", e);
            }
        }
    }
}

fn build_store(settings: &StorageSettings) -> Result<Arc<dyn SubscriptionStore>, Box<dyn std::error::Error>> {
    match settings.backend.as_str() {
        "sled" => Ok(Arc::new(SledStore::new(&settings.path, settings.ttl())?)),
        _ => Ok(Arc::new(MemoryStore::new(settings.ttl()))),
    }
}

async fn build_driver(
    settings: &BroadcastSettings,
    bus: &ChannelDriver,
) -> Result<Arc<dyn BroadcastDriver>, Box<dyn std::error::Error>> {
    match settings.driver.as_str() {
        "log" => Ok(Arc::new(LogDriver::new())),
        "websocket" => Ok(Arc::new(WebSocketDriver::connect(&settings.push_url).await?)),
        _ => Ok(Arc::new(bus.clone())),
    }
}

async fn run_gateway() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let store = build_store(&config.storage)?;
    let bus = ChannelDriver::default();
    let driver = build_driver(&config.broadcast, &bus).await?;
    let topics = Arc::new(FieldTopicResolver);

    let registry = SubscriptionRegistry::new(store.clone(), topics.clone());
    let broadcaster = Broadcaster::new(
        store,
        topics,
        FilterRegistry::new(),
        ResolutionEngine::new(Arc::new(PassthroughExecutor)),
        driver,
    )
    .with_queue();

    let gateway = Gateway::new(registry, broadcaster, Some(bus));

    tokio::select! {
        _ = start_gateway(&addr, gateway) => {
            error!("Gateway exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    Ok(())
}

async fn run_client(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    use futures_util::{SinkExt, StreamExt};
    use serde_json::json;
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::Message as WsMessage;

    let (mut ws_stream, _response) = connect_async(url).await?;

    // 1. Subscribe
    let subscribe = json!({
        "type": "subscribe",
        "field_name": "onPostCreated",
        "query": "subscription { onPostCreated { body } }"
    });
    ws_stream
        .send(WsMessage::text(subscribe.to_string()))
        .await?;

    // 2. Read the acknowledgment and extract the channel
    if let Some(Ok(WsMessage::Text(msg))) = ws_stream.next().await {
        println!("Subscribe ack: {msg}");
        let v: serde_json::Value = serde_json::from_str(&msg)?;
        if let Some(channel) = v["extensions"]["lighthouse_subscriptions"]["channels"]
            ["onPostCreated"]
            .as_str()
        {
            // 3. Listen on the advertised channel
            let listen = json!({ "type": "listen", "channel": channel });
            ws_stream.send(WsMessage::text(listen.to_string())).await?;

            // 4. Trigger a broadcast
            let broadcast = json!({
                "type": "broadcast",
                "field_name": "onPostCreated",
                "root": { "body": "Hello from lumen" }
            });
            ws_stream
                .send(WsMessage::text(broadcast.to_string()))
                .await?;

            // 5. Read the pushed event
            if let Some(Ok(WsMessage::Text(incoming))) = ws_stream.next().await {
                println!("Incoming: {incoming}");
            }
        }
    }

    Ok(())
}
