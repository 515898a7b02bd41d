use serial_test::serial;

use super::load_config;
use super::settings::Settings;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.gateway.host, "127.0.0.1");
    assert_eq!(settings.gateway.port, 8080);
    assert_eq!(settings.broadcast.driver, "channel");
    assert_eq!(settings.storage.backend, "memory");
    assert_eq!(settings.storage.ttl_secs, 3600);
}

#[test]
fn test_zero_ttl_disables_expiry() {
    let mut settings = Settings::default();
    assert_eq!(settings.storage.ttl(), Some(3600));
    settings.storage.ttl_secs = 0;
    assert_eq!(settings.storage.ttl(), None);
}

#[test]
#[serial]
fn test_environment_overrides_defaults() {
    temp_env::with_vars(
        [
            ("GATEWAY_PORT", Some("9100")),
            ("BROADCAST_DRIVER", Some("log")),
            ("STORAGE_BACKEND", Some("sled")),
        ],
        || {
            let settings = load_config().expect("load_config failed");
            assert_eq!(settings.gateway.port, 9100);
            assert_eq!(settings.broadcast.driver, "log");
            assert_eq!(settings.storage.backend, "sled");
            // Untouched values fall back to defaults
            assert_eq!(settings.gateway.host, "127.0.0.1");
        },
    );
}

#[test]
#[serial]
fn test_without_sources_yields_defaults() {
    temp_env::with_vars_unset(["GATEWAY_PORT", "BROADCAST_DRIVER", "STORAGE_BACKEND"], || {
        let settings = load_config().expect("load_config failed");
        assert_eq!(settings.gateway.port, Settings::default().gateway.port);
        assert_eq!(settings.broadcast.driver, "channel");
    });
}
