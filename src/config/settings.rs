use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for the delivery gateway, the broadcast driver and the
/// subscription store.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub gateway: GatewaySettings,
    pub broadcast: BroadcastSettings,
    pub storage: StorageSettings,
}

/// Configuration settings for the websocket gateway.
///
/// Defines the host and port the gateway will bind to.
#[derive(Debug, Deserialize, Clone)]
pub struct GatewaySettings {
    pub host: String,
    pub port: u16,
}

/// Configuration settings for broadcasting.
///
/// `driver` selects the active delivery driver for the deployment:
/// `"log"`, `"channel"` or `"websocket"`. `push_url` is the gateway the
/// websocket driver pushes to.
#[derive(Debug, Deserialize, Clone)]
pub struct BroadcastSettings {
    pub driver: String,
    pub push_url: String,
}

/// Configuration settings for subscriber storage.
///
/// `backend` is `"memory"` or `"sled"`; `path` is the sled database
/// location. `ttl_secs` bounds how long an abandoned registration lives,
/// with `0` disabling expiry.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub backend: String,
    pub path: String,
    pub ttl_secs: i64,
}

impl StorageSettings {
    /// The TTL as stores expect it: `None` when expiry is disabled.
    pub fn ttl(&self) -> Option<i64> {
        (self.ttl_secs > 0).then_some(self.ttl_secs)
    }
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub gateway: Option<PartialGatewaySettings>,
    pub broadcast: Option<PartialBroadcastSettings>,
    pub storage: Option<PartialStorageSettings>,
}

/// Partial gateway settings.
#[derive(Debug, Deserialize)]
pub struct PartialGatewaySettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Partial broadcast settings.
#[derive(Debug, Deserialize)]
pub struct PartialBroadcastSettings {
    pub driver: Option<String>,
    pub push_url: Option<String>,
}

/// Partial storage settings.
#[derive(Debug, Deserialize)]
pub struct PartialStorageSettings {
    pub backend: Option<String>,
    pub path: Option<String>,
    pub ttl_secs: Option<i64>,
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            gateway: GatewaySettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            broadcast: BroadcastSettings {
                driver: "channel".to_string(),
                push_url: "ws://127.0.0.1:8080".to_string(),
            },
            storage: StorageSettings {
                backend: "memory".to_string(),
                path: "subscriptions_db".to_string(),
                ttl_secs: 3600,
            },
        }
    }
}
