use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for the hub connection, the demo client, and logging.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub hub: HubSettings,
    pub client: ClientSettings,
    pub log: LogSettings,
}

/// Configuration settings for the hub connection.
///
/// Defines where to dial and the keepalive/timeout/reconnect behavior.
#[derive(Debug, Deserialize, Clone)]
pub struct HubSettings {
    pub url: String,
    pub keepalive_secs: u64,
    pub server_timeout_secs: u64,
    pub automatic_reconnect: bool,
}

/// Configuration settings for the demo client.
#[derive(Debug, Deserialize, Clone)]
pub struct ClientSettings {
    pub topic: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub hub: Option<PartialHubSettings>,
    pub client: Option<PartialClientSettings>,
    pub log: Option<PartialLogSettings>,
}

/// Partial hub settings.
///
/// Used when loading hub configuration from external sources with optional values.
#[derive(Debug, Deserialize)]
pub struct PartialHubSettings {
    pub url: Option<String>,
    pub keepalive_secs: Option<u64>,
    pub server_timeout_secs: Option<u64>,
    pub automatic_reconnect: Option<bool>,
}

/// Partial client settings.
#[derive(Debug, Deserialize)]
pub struct PartialClientSettings {
    pub topic: Option<String>,
}

/// Partial logging settings.
#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            hub: HubSettings {
                url: "ws://127.0.0.1:8080/notifications".to_string(),
                keepalive_secs: 15,
                server_timeout_secs: 30,
                automatic_reconnect: true,
            },
            client: ClientSettings {
                topic: "system".to_string(),
            },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}
