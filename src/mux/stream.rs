use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use super::notification::Notification;

/// Opaque token identifying one registered listener.
///
/// Tokens are minted per registration, so registering the same callback
/// twice yields two tokens and unsubscribing one leaves the other intact.
pub type ListenerId = Uuid;

/// Callback invoked for every notification published on a stream.
pub type Listener = Box<dyn FnMut(Notification) + Send>;

/// Listeners are shared so dispatch can invoke them after releasing the
/// registry lock.
pub(crate) type SharedListener = Arc<Mutex<Listener>>;

/// Represents the per-topic fan-out structure of the multiplexer.
///
/// A stream holds the listeners currently attached to one topic. Dispatch
/// delivers to the listeners attached at the instant of publication; there
/// is no buffering or replay, so a listener only sees notifications
/// published while it is registered.
pub struct Stream {
    pub topic: String,
    listeners: HashMap<ListenerId, SharedListener>,
}

impl Stream {
    /// Creates a new stream for the given topic with no listeners.
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            listeners: HashMap::new(),
        }
    }

    /// Attaches a listener and returns its token.
    pub fn add_listener(&mut self, listener: Listener) -> ListenerId {
        let id = Uuid::new_v4();
        self.listeners.insert(id, Arc::new(Mutex::new(listener)));
        id
    }

    /// Detaches the listener behind `id`. Returns `false` when the token is
    /// unknown, which happens when the same handle is released twice.
    pub fn remove_listener(&mut self, id: &ListenerId) -> bool {
        self.listeners.remove(id).is_some()
    }

    /// Number of currently attached listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// The listeners attached at this instant. Delivery order across
    /// listeners is not specified.
    pub(crate) fn snapshot(&self) -> Vec<SharedListener> {
        self.listeners.values().cloned().collect()
    }
}
