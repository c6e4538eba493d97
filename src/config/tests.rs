use serial_test::serial;

use super::{Settings, load_config};

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.hub.url, "ws://127.0.0.1:8080/notifications");
    assert_eq!(settings.hub.keepalive_secs, 15);
    assert_eq!(settings.hub.server_timeout_secs, 30);
    assert!(settings.hub.automatic_reconnect);
    assert_eq!(settings.client.topic, "system");
    assert_eq!(settings.log.level, "info");
}

#[test]
#[serial]
fn test_env_overrides_hub_url() {
    temp_env::with_var("HUB_URL", Some("ws://example.test:9000/notifications"), || {
        let settings = load_config().expect("Failed to load configuration");
        assert_eq!(settings.hub.url, "ws://example.test:9000/notifications");
    });
}

#[test]
#[serial]
fn test_env_overrides_client_topic() {
    temp_env::with_var("CLIENT_TOPIC", Some("alerts"), || {
        let settings = load_config().expect("Failed to load configuration");
        assert_eq!(settings.client.topic, "alerts");
    });
}

#[test]
#[serial]
fn test_missing_sources_fall_back_to_defaults() {
    temp_env::with_vars_unset(["HUB_URL", "CLIENT_TOPIC"], || {
        let settings = load_config().expect("Failed to load configuration");
        assert_eq!(settings.hub.keepalive_secs, 15);
        assert_eq!(settings.client.topic, "system");
    });
}
