use std::sync::Arc;
use std::time::Duration;

use super::connection::HubConnection;

/// Configures and builds a [`HubConnection`].
///
/// Defaults: 15 second keepalive pings, a 30 second server timeout, and
/// automatic reconnect enabled.
pub struct HubConnectionBuilder {
    url: String,
    keepalive_interval: Duration,
    server_timeout: Duration,
    automatic_reconnect: bool,
}

impl HubConnectionBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            keepalive_interval: Duration::from_secs(15),
            server_timeout: Duration::from_secs(30),
            automatic_reconnect: true,
        }
    }

    /// Interval between keepalive pings sent to the hub.
    pub fn with_keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval = interval;
        self
    }

    /// The connection is considered dead if the hub has sent nothing for
    /// this long.
    pub fn with_server_timeout(mut self, timeout: Duration) -> Self {
        self.server_timeout = timeout;
        self
    }

    /// Whether to reconnect after an unexpected close. Attempts are delayed
    /// by 0, 2, 10, and 30 seconds, then the connection stays down.
    pub fn with_automatic_reconnect(mut self, enabled: bool) -> Self {
        self.automatic_reconnect = enabled;
        self
    }

    pub fn build(self) -> Arc<HubConnection> {
        HubConnection::new(
            self.url,
            self.keepalive_interval,
            self.server_timeout,
            self.automatic_reconnect,
        )
    }
}
