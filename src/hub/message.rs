use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frames this client sends to the hub.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientFrame {
    /// A remote method call, e.g. `Subscribe` with the topic as its only
    /// argument. Fire-and-forget: the hub sends no reply payload.
    #[serde(rename = "invoke")]
    Invoke { target: String, arguments: Vec<Value> },

    /// Keepalive probe.
    #[serde(rename = "ping")]
    Ping,

    /// Reply to a hub ping.
    #[serde(rename = "pong")]
    Pong,
}

/// Frames the hub sends to this client.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerFrame {
    /// A named push event. Notifications arrive as target
    /// `ReceiveNotification` with arguments `[topic, timestamp, title, body]`.
    #[serde(rename = "event")]
    Event { target: String, arguments: Vec<Value> },

    #[serde(rename = "ping")]
    Ping,

    #[serde(rename = "pong")]
    Pong,
}
