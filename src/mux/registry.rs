use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use serde_json::json;
use tracing::{debug, warn};

use crate::hub::HubLink;
use super::notification::Notification;
use super::stream::{Listener, ListenerId, Stream};
use super::subscription::Subscription;

/// Remote method that tells the hub to start routing a topic to this client.
const SUBSCRIBE_METHOD: &str = "Subscribe";
/// Remote method that tells the hub to stop routing a topic to this client.
const UNSUBSCRIBE_METHOD: &str = "Unsubscribe";

/// The single source of truth for which topics are network-subscribed and
/// who is locally listening.
///
/// The registry owns the topic → [`Stream`] map exclusively. A stream exists
/// for a topic exactly while it has at least one listener; the network
/// `Subscribe` call is issued once when a topic's stream is created and the
/// matching `Unsubscribe` once when its last listener leaves. All map
/// bookkeeping happens under one lock acquisition, so a subscribe racing a
/// teardown can only ever observe "topic absent" and start fresh, never
/// attach to a stream that is mid-teardown.
///
/// Dispatch snapshots a stream's listeners under the lock and invokes them
/// after releasing it, so a listener may call back into the registry,
/// including unsubscribing its own handle. A removal is visible to the next
/// dispatch; a fan-out already in flight still delivers to its snapshot.
pub struct Registry {
    link: Arc<dyn HubLink>,
    weak_self: Weak<Registry>,
    streams: Mutex<HashMap<String, Stream>>,
}

impl Registry {
    /// Creates an empty registry bound to the given hub link. The registry
    /// lives as long as the connection; dropping it renders every handed-out
    /// [`Subscription`] inert.
    pub fn new(link: Arc<dyn HubLink>) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            link,
            weak_self: weak.clone(),
            streams: Mutex::new(HashMap::new()),
        })
    }

    /// Attaches `listener` to `topic`, creating the stream and issuing the
    /// network `Subscribe` call if this is the topic's first listener.
    ///
    /// Returns `None` without touching the registry when the hub is not
    /// ready or not connected. The stream is inserted into the map before
    /// the network call goes out, so an inbound notification arriving ahead
    /// of the hub's acknowledgment already finds it. The invoke itself is
    /// fire-and-forget: a failure is logged but does not roll back the
    /// listener registration.
    pub fn subscribe(&self, topic: &str, listener: Listener) -> Option<Subscription> {
        if !self.link.is_ready() || !self.link.is_connected() {
            warn!("subscribe to '{topic}' refused: hub is not connected");
            return None;
        }

        let listener_id;
        {
            let mut streams = self.streams.lock().unwrap();
            let created = !streams.contains_key(topic);
            let stream = streams
                .entry(topic.to_string())
                .or_insert_with(|| Stream::new(topic));
            listener_id = stream.add_listener(listener);

            if created {
                debug!("materializing network subscription for '{topic}'");
                if let Err(e) = self.link.invoke(SUBSCRIBE_METHOD, vec![json!(topic)]) {
                    warn!("Subscribe invoke for '{topic}' failed: {e}");
                }
            }
        }

        Some(Subscription::new(
            topic.to_string(),
            listener_id,
            self.weak_self.clone(),
        ))
    }

    /// Routes an inbound notification to the stream for its topic, fanning
    /// it out to every listener registered at the instant of publication.
    /// A notification for a topic with no stream is silently dropped; that
    /// is expected during unsubscribe races.
    ///
    /// The listener set is snapshotted under the lock and invoked outside
    /// it, so a listener unsubscribing mid-fan-out does not deadlock.
    pub fn dispatch(&self, notification: Notification) {
        let listeners = {
            let streams = self.streams.lock().unwrap();
            let Some(stream) = streams.get(&notification.topic) else {
                debug!(
                    "dropping notification for topic '{}' with no listeners",
                    notification.topic
                );
                return;
            };
            stream.snapshot()
        };

        for listener in listeners {
            let mut listener = listener.lock().unwrap();
            (*listener)(notification.clone());
        }
    }

    /// Detaches one listener, called by [`Subscription::unsubscribe`].
    ///
    /// Missing topic or unknown token are no-ops. When the last listener
    /// leaves, the stream is removed and the network `Unsubscribe` issued
    /// in the same locked step.
    pub(crate) fn release(&self, topic: &str, listener_id: &ListenerId) {
        let mut streams = self.streams.lock().unwrap();
        let Some(stream) = streams.get_mut(topic) else {
            return;
        };
        if !stream.remove_listener(listener_id) {
            return;
        }

        if stream.listener_count() == 0 {
            streams.remove(topic);
            debug!("releasing network subscription for '{topic}'");
            if let Err(e) = self.link.invoke(UNSUBSCRIBE_METHOD, vec![json!(topic)]) {
                warn!("Unsubscribe invoke for '{topic}' failed: {e}");
            }
        }
    }

    /// Whether a stream currently exists for `topic`.
    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.streams.lock().unwrap().contains_key(topic)
    }

    /// Number of topics with at least one listener.
    pub fn topic_count(&self) -> usize {
        self.streams.lock().unwrap().len()
    }
}
