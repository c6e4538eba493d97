mod settings;

#[cfg(test)]
mod tests;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{ClientSettings, HubSettings, LogSettings, Settings};

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct containing the hub, client, and log configurations
///
/// Environment overrides use `_` as the nesting separator, so only
/// single-word fields are reachable from the environment (`HUB_URL`,
/// `CLIENT_TOPIC`, `LOG_LEVEL`). Multi-word fields such as
/// `server_timeout_secs` can only be set through the configuration file.
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
        hub: HubSettings {
            url: partial
                .hub
                .as_ref()
                .and_then(|h| h.url.clone())
                .unwrap_or(default.hub.url),
            keepalive_secs: partial
                .hub
                .as_ref()
                .and_then(|h| h.keepalive_secs)
                .unwrap_or(default.hub.keepalive_secs),
            server_timeout_secs: partial
                .hub
                .as_ref()
                .and_then(|h| h.server_timeout_secs)
                .unwrap_or(default.hub.server_timeout_secs),
            automatic_reconnect: partial
                .hub
                .as_ref()
                .and_then(|h| h.automatic_reconnect)
                .unwrap_or(default.hub.automatic_reconnect),
        },
        client: ClientSettings {
            topic: partial
                .client
                .as_ref()
                .and_then(|c| c.topic.clone())
                .unwrap_or(default.client.topic),
        },
        log: LogSettings {
            level: partial
                .log
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.log.level),
        },
    })
}
