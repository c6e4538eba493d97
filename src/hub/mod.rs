//! The connection adapter.
//!
//! [`HubLink`] is the contract the multiplexing engine depends on: readiness
//! flags plus a fire-and-forget `invoke`. [`HubConnection`] is the WebSocket
//! implementation, configured through [`HubConnectionBuilder`].

pub mod builder;
pub mod connection;
pub mod message;


pub use builder::HubConnectionBuilder;
pub use connection::HubConnection;

use serde_json::Value;

use crate::utils::error::HubError;

/// Name of the inbound event the hub uses for pushed notifications.
pub const NOTIFICATION_EVENT: &str = "ReceiveNotification";

/// Handler for one named inbound event. Called with the event's argument
/// list from the connection's read loop.
pub type EventHandler = Box<dyn Fn(&[Value]) + Send + Sync>;

/// What the engine needs from a hub connection.
///
/// `invoke` enqueues a remote call and returns without awaiting the network;
/// the engine never blocks listener-facing operations on its completion.
pub trait HubLink: Send + Sync {
    /// True once local handler wiring is complete.
    fn is_ready(&self) -> bool;

    /// True while the transport session is established.
    fn is_connected(&self) -> bool;

    /// Sends a fire-and-forget remote call to the hub.
    fn invoke(&self, target: &str, arguments: Vec<Value>) -> Result<(), HubError>;
}
