use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::error::HubError;

/// A single notification pushed by the hub.
///
/// Notifications are immutable values produced only from inbound hub events;
/// the engine never mutates one after it is constructed. The `topic` doubles
/// as the routing key used to pick the stream the notification fans out on.
///
/// # Fields
///
/// - `topic` - The name of the topic this notification belongs to.
/// - `timestamp` - When the hub produced the notification.
/// - `title` - Short human-readable headline.
/// - `body` - The notification text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub topic: String,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub body: String,
}

impl Notification {
    /// Builds a notification from the argument list of an inbound
    /// `ReceiveNotification` event: `[topic, timestamp, title, body]`.
    ///
    /// The timestamp may arrive either as an RFC 3339 string or as epoch
    /// milliseconds, depending on how the hub serializes dates.
    pub fn from_event_args(args: &[Value]) -> Result<Self, HubError> {
        let [topic, timestamp, title, body] = args else {
            return Err(HubError::MalformedEvent(format!(
                "expected 4 arguments, got {}",
                args.len()
            )));
        };

        let topic = topic
            .as_str()
            .ok_or_else(|| HubError::MalformedEvent("topic is not a string".into()))?;
        let title = title
            .as_str()
            .ok_or_else(|| HubError::MalformedEvent("title is not a string".into()))?;
        let body = body
            .as_str()
            .ok_or_else(|| HubError::MalformedEvent("body is not a string".into()))?;
        let timestamp = parse_timestamp(timestamp)?;

        Ok(Self {
            topic: topic.to_string(),
            timestamp,
            title: title.to_string(),
            body: body.to_string(),
        })
    }
}

fn parse_timestamp(value: &Value) -> Result<DateTime<Utc>, HubError> {
    if let Some(text) = value.as_str() {
        return DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| HubError::MalformedEvent(format!("bad timestamp '{text}': {e}")));
    }

    if let Some(millis) = value.as_i64() {
        return Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| HubError::MalformedEvent(format!("bad timestamp {millis}")));
    }

    Err(HubError::MalformedEvent(
        "timestamp is neither a string nor a number".into(),
    ))
}
