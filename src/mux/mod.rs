//! The multiplexing engine.
//!
//! This module maps topics to per-topic streams, reference-counts local
//! listeners, and decides when the network-level `Subscribe`/`Unsubscribe`
//! calls are issued. [`Multiplexer`] is the application-facing facade that
//! ties a hub connection to a [`Registry`].

pub mod notification;
pub mod registry;
pub mod stream;
pub mod subscription;

#[cfg(test)]
mod tests;

pub use notification::Notification;
pub use registry::Registry;
pub use subscription::Subscription;

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::hub::{HubConnection, HubLink, NOTIFICATION_EVENT};
use crate::utils::error::HubError;

/// Application-facing entry point: one hub connection plus the registry
/// multiplexing local listeners onto it.
///
/// Construction wires the hub's notification event to the registry and marks
/// the hub ready; `connect` may be called afterwards. When the multiplexer is
/// dropped the registry goes with it and all outstanding [`Subscription`]
/// handles become inert.
pub struct Multiplexer {
    hub: Arc<HubConnection>,
    registry: Arc<Registry>,
}

impl Multiplexer {
    /// Binds the inbound notification event to the registry's dispatch and
    /// marks the hub ready. Fails if a notification handler is already bound
    /// on this hub.
    pub fn new(hub: Arc<HubConnection>) -> Result<Self, HubError> {
        let registry = Registry::new(hub.clone() as Arc<dyn HubLink>);

        let dispatch_target = Arc::downgrade(&registry);
        hub.on(
            NOTIFICATION_EVENT,
            Box::new(move |args: &[Value]| {
                let Some(registry) = dispatch_target.upgrade() else {
                    return;
                };
                match Notification::from_event_args(args) {
                    Ok(notification) => registry.dispatch(notification),
                    Err(e) => warn!("ignoring inbound notification: {e}"),
                }
            }),
        )?;
        hub.mark_ready();

        Ok(Self { hub, registry })
    }

    /// Establishes the transport session. A silent no-op when the hub is not
    /// ready or already connected.
    pub async fn connect(&self) -> Result<(), HubError> {
        self.hub.connect().await
    }

    /// Attaches `listener` to `topic`. Returns `None` while the connection
    /// is not established; callers should gate subscribe affordances on
    /// [`is_connected`](Self::is_connected).
    pub fn subscribe(
        &self,
        topic: &str,
        listener: impl FnMut(Notification) + Send + 'static,
    ) -> Option<Subscription> {
        self.registry.subscribe(topic, Box::new(listener))
    }

    /// True once local listener wiring is complete.
    pub fn is_ready(&self) -> bool {
        self.hub.is_ready()
    }

    /// True while the transport session is established.
    pub fn is_connected(&self) -> bool {
        self.hub.is_connected()
    }

    /// The underlying registry, mainly useful for introspection.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}
