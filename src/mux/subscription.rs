use std::sync::Weak;
use std::sync::atomic::{AtomicBool, Ordering};

use super::registry::Registry;
use super::stream::ListenerId;

/// Capability token returned by each `subscribe` call.
///
/// A subscription releases exactly the one listener it was minted for.
/// [`unsubscribe`](Self::unsubscribe) is idempotent, and once the owning
/// registry is gone (connection torn down) the handle is inert: calling it
/// is still safe but performs no network action.
///
/// Dropping a subscription does NOT unsubscribe; the listener stays attached
/// until `unsubscribe` is called or the connection is torn down.
pub struct Subscription {
    topic: String,
    listener_id: ListenerId,
    registry: Weak<Registry>,
    released: AtomicBool,
}

impl Subscription {
    pub(crate) fn new(topic: String, listener_id: ListenerId, registry: Weak<Registry>) -> Self {
        Self {
            topic,
            listener_id,
            registry,
            released: AtomicBool::new(false),
        }
    }

    /// The topic this subscription listens on.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Detaches the listener this handle represents. The first call takes
    /// effect; every later call is a no-op.
    pub fn unsubscribe(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.release(&self.topic, &self.listener_id);
        }
    }
}
