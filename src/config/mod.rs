mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{BroadcastSettings, GatewaySettings, Settings, StorageSettings};

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct containing the gateway, broadcast and storage configurations
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("_"));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        gateway: GatewaySettings {
            host: partial
                .gateway
                .as_ref()
                .and_then(|g| g.host.clone())
                .unwrap_or(default.gateway.host),
            port: partial
                .gateway
                .as_ref()
                .and_then(|g| g.port)
                .unwrap_or(default.gateway.port),
        },
        broadcast: BroadcastSettings {
            driver: partial
                .broadcast
                .as_ref()
                .and_then(|b| b.driver.clone())
                .unwrap_or(default.broadcast.driver),
            push_url: partial
                .broadcast
                .as_ref()
                .and_then(|b| b.push_url.clone())
                .unwrap_or(default.broadcast.push_url),
        },
        storage: StorageSettings {
            backend: partial
                .storage
                .as_ref()
                .and_then(|s| s.backend.clone())
                .unwrap_or(default.storage.backend),
            path: partial
                .storage
                .as_ref()
                .and_then(|s| s.path.clone())
                .unwrap_or(default.storage.path),
            ttl_secs: partial
                .storage
                .as_ref()
                .and_then(|s| s.ttl_secs)
                .unwrap_or(default.storage.ttl_secs),
        },
    })
}

#[cfg(test)]
mod tests;
