use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::Value;

use super::notification::Notification;
use super::registry::Registry;
use super::subscription::Subscription;
use crate::hub::HubLink;
use crate::utils::error::HubError;

/// Fake hub link that records every invoke and can simulate a link that is
/// down or whose invokes fail.
#[derive(Default)]
struct RecordingLink {
    ready: AtomicBool,
    connected: AtomicBool,
    fail_invokes: AtomicBool,
    invokes: Mutex<Vec<(String, String)>>,
}

impl RecordingLink {
    fn connected() -> Arc<Self> {
        let link = Self::default();
        link.ready.store(true, Ordering::SeqCst);
        link.connected.store(true, Ordering::SeqCst);
        Arc::new(link)
    }

    fn invoked(&self, target: &str, topic: &str) -> usize {
        self.invokes
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, arg)| t == target && arg == topic)
            .count()
    }
}

impl HubLink for RecordingLink {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn invoke(&self, target: &str, arguments: Vec<Value>) -> Result<(), HubError> {
        if self.fail_invokes.load(Ordering::SeqCst) {
            return Err(HubError::NotConnected);
        }
        let topic = arguments
            .first()
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        self.invokes
            .lock()
            .unwrap()
            .push((target.to_string(), topic));
        Ok(())
    }
}

fn notification(topic: &str, title: &str, body: &str) -> Notification {
    Notification {
        topic: topic.to_string(),
        timestamp: Utc::now(),
        title: title.to_string(),
        body: body.to_string(),
    }
}

/// Listener that collects every received notification into a shared vec.
fn collector() -> (Arc<Mutex<Vec<Notification>>>, impl FnMut(Notification) + Send) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    (received, move |n| sink.lock().unwrap().push(n))
}

#[test]
fn test_dispatch_without_stream_is_dropped() {
    let link = RecordingLink::connected();
    let registry = Registry::new(link);

    // No subscription for this topic exists; nothing should happen.
    registry.dispatch(notification("system", "t1", "b1"));
    assert_eq!(registry.topic_count(), 0);
}

#[test]
fn test_each_listener_receives_notification_exactly_once() {
    let link = RecordingLink::connected();
    let registry = Registry::new(link);

    let (a_received, a) = collector();
    let (b_received, b) = collector();
    let (c_received, c) = collector();
    let _sa = registry.subscribe("system", Box::new(a)).unwrap();
    let _sb = registry.subscribe("system", Box::new(b)).unwrap();
    let _sc = registry.subscribe("system", Box::new(c)).unwrap();

    registry.dispatch(notification("system", "t1", "b1"));

    for received in [&a_received, &b_received, &c_received] {
        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].title, "t1");
        assert_eq!(received[0].body, "b1");
    }
}

#[test]
fn test_single_network_subscribe_across_many_listeners() {
    let link = RecordingLink::connected();
    let registry = Registry::new(link.clone());

    let subs: Vec<_> = (0..5)
        .map(|_| registry.subscribe("system", Box::new(|_| {})).unwrap())
        .collect();

    assert_eq!(link.invoked("Subscribe", "system"), 1);
    assert_eq!(registry.topic_count(), 1);

    // Releasing all but one must not touch the network.
    for sub in &subs[..4] {
        sub.unsubscribe();
    }
    assert_eq!(link.invoked("Unsubscribe", "system"), 0);
    assert!(registry.is_subscribed("system"));
}

#[test]
fn test_last_unsubscribe_releases_network_subscription() {
    let link = RecordingLink::connected();
    let registry = Registry::new(link.clone());

    let first = registry.subscribe("system", Box::new(|_| {})).unwrap();
    let second = registry.subscribe("system", Box::new(|_| {})).unwrap();

    first.unsubscribe();
    assert_eq!(link.invoked("Unsubscribe", "system"), 0);

    second.unsubscribe();
    assert_eq!(link.invoked("Unsubscribe", "system"), 1);
    assert!(!registry.is_subscribed("system"));
}

#[test]
fn test_unsubscribe_is_idempotent() {
    let link = RecordingLink::connected();
    let registry = Registry::new(link.clone());

    let (b_received, b) = collector();
    let first = registry.subscribe("system", Box::new(|_| {})).unwrap();
    let _second = registry.subscribe("system", Box::new(b)).unwrap();

    first.unsubscribe();
    first.unsubscribe();
    first.unsubscribe();

    // The second listener is untouched and the stream survives.
    assert!(registry.is_subscribed("system"));
    assert_eq!(link.invoked("Unsubscribe", "system"), 0);

    registry.dispatch(notification("system", "t1", "b1"));
    assert_eq!(b_received.lock().unwrap().len(), 1);
}

#[test]
fn test_dispatch_after_full_teardown_is_dropped() {
    let link = RecordingLink::connected();
    let registry = Registry::new(link);

    let (received, listener) = collector();
    let sub = registry.subscribe("system", Box::new(listener)).unwrap();
    sub.unsubscribe();

    registry.dispatch(notification("system", "t1", "b1"));
    assert!(received.lock().unwrap().is_empty());
}

#[test]
fn test_resubscribe_after_teardown_starts_fresh() {
    let link = RecordingLink::connected();
    let registry = Registry::new(link.clone());

    let first = registry.subscribe("system", Box::new(|_| {})).unwrap();
    first.unsubscribe();
    assert_eq!(link.invoked("Unsubscribe", "system"), 1);

    let (received, listener) = collector();
    let _second = registry.subscribe("system", Box::new(listener)).unwrap();

    assert_eq!(link.invoked("Subscribe", "system"), 2);
    registry.dispatch(notification("system", "t2", "b2"));
    assert_eq!(received.lock().unwrap().len(), 1);
}

#[test]
fn test_listeners_joining_in_turn() {
    let link = RecordingLink::connected();
    let registry = Registry::new(link);

    let (a_received, a) = collector();
    let _sa = registry.subscribe("system", Box::new(a)).unwrap();

    registry.dispatch(notification("system", "t1", "b1"));
    {
        let a_received = a_received.lock().unwrap();
        assert_eq!(a_received.len(), 1);
        assert_eq!(a_received[0].topic, "system");
        assert_eq!(a_received[0].title, "t1");
        assert_eq!(a_received[0].body, "b1");
    }

    // A listener joining later does not see past notifications.
    let (b_received, b) = collector();
    let _sb = registry.subscribe("system", Box::new(b)).unwrap();
    assert!(b_received.lock().unwrap().is_empty());

    registry.dispatch(notification("system", "t2", "b2"));
    let a_received = a_received.lock().unwrap();
    let b_received = b_received.lock().unwrap();
    assert_eq!(a_received.len(), 2);
    assert_eq!(b_received.len(), 1);
    assert_eq!(b_received[0].title, "t2");
}

#[test]
fn test_partial_then_full_unsubscribe() {
    let link = RecordingLink::connected();
    let registry = Registry::new(link.clone());

    let (a_received, a) = collector();
    let (b_received, b) = collector();
    let sa = registry.subscribe("system", Box::new(a)).unwrap();
    let sb = registry.subscribe("system", Box::new(b)).unwrap();

    sa.unsubscribe();
    registry.dispatch(notification("system", "t1", "b1"));
    assert!(a_received.lock().unwrap().is_empty());
    assert_eq!(b_received.lock().unwrap().len(), 1);
    assert_eq!(link.invoked("Unsubscribe", "system"), 0);

    sb.unsubscribe();
    assert_eq!(link.invoked("Unsubscribe", "system"), 1);

    registry.dispatch(notification("system", "t2", "b2"));
    assert_eq!(b_received.lock().unwrap().len(), 1);
}

#[test]
fn test_subscribe_refused_when_not_connected() {
    let link = Arc::new(RecordingLink::default());
    link.ready.store(true, Ordering::SeqCst);
    let registry = Registry::new(link.clone());

    assert!(registry.subscribe("system", Box::new(|_| {})).is_none());
    assert_eq!(registry.topic_count(), 0);
    assert!(link.invokes.lock().unwrap().is_empty());
}

#[test]
fn test_subscribe_refused_before_ready() {
    let link = Arc::new(RecordingLink::default());
    link.connected.store(true, Ordering::SeqCst);
    let registry = Registry::new(link.clone());

    assert!(registry.subscribe("system", Box::new(|_| {})).is_none());
    assert_eq!(registry.topic_count(), 0);
}

#[test]
fn test_failed_subscribe_invoke_keeps_local_listener() {
    let link = RecordingLink::connected();
    link.fail_invokes.store(true, Ordering::SeqCst);
    let registry = Registry::new(link.clone());

    // Materialization is optimistic: the listener stays registered even
    // though the network call failed.
    let (received, listener) = collector();
    let sub = registry.subscribe("system", Box::new(listener));
    assert!(sub.is_some());
    assert!(registry.is_subscribed("system"));

    registry.dispatch(notification("system", "t1", "b1"));
    assert_eq!(received.lock().unwrap().len(), 1);
}

#[test]
fn test_unsubscribe_after_registry_dropped_is_inert() {
    let link = RecordingLink::connected();
    let registry = Registry::new(link.clone());

    let sub = registry.subscribe("system", Box::new(|_| {})).unwrap();
    drop(registry);

    // The handle outlives the connection; releasing it must be a safe no-op.
    sub.unsubscribe();
    sub.unsubscribe();
    assert_eq!(link.invoked("Unsubscribe", "system"), 0);
}

#[test]
fn test_same_callback_twice_gets_distinct_tokens() {
    let link = RecordingLink::connected();
    let registry = Registry::new(link);

    let (received, _) = collector();
    let make = |sink: Arc<Mutex<Vec<Notification>>>| move |n| sink.lock().unwrap().push(n);

    let first = registry
        .subscribe("system", Box::new(make(received.clone())))
        .unwrap();
    let _second = registry
        .subscribe("system", Box::new(make(received.clone())))
        .unwrap();

    first.unsubscribe();
    registry.dispatch(notification("system", "t1", "b1"));
    assert_eq!(received.lock().unwrap().len(), 1);
}

#[test]
fn test_independent_topics_do_not_interfere() {
    let link = RecordingLink::connected();
    let registry = Registry::new(link.clone());

    let (sys_received, sys) = collector();
    let (ops_received, ops) = collector();
    let _ss = registry.subscribe("system", Box::new(sys)).unwrap();
    let so = registry.subscribe("ops", Box::new(ops)).unwrap();

    registry.dispatch(notification("system", "t1", "b1"));
    assert_eq!(sys_received.lock().unwrap().len(), 1);
    assert!(ops_received.lock().unwrap().is_empty());

    so.unsubscribe();
    assert_eq!(link.invoked("Unsubscribe", "ops"), 1);
    assert_eq!(link.invoked("Unsubscribe", "system"), 0);
    assert!(registry.is_subscribed("system"));
}

#[test]
fn test_listener_may_unsubscribe_sibling_mid_dispatch() {
    let link = RecordingLink::connected();
    let registry = Registry::new(link.clone());

    let (b_received, b) = collector();
    let sb = Arc::new(registry.subscribe("system", Box::new(b)).unwrap());

    // Listener A tears down B's handle from inside the fan-out.
    let sb_for_a = sb.clone();
    let _sa = registry
        .subscribe("system", Box::new(move |_| sb_for_a.unsubscribe()))
        .unwrap();

    registry.dispatch(notification("system", "t1", "b1"));

    // B is gone for subsequent dispatches while A keeps the stream alive.
    registry.dispatch(notification("system", "t2", "b2"));
    assert!(
        b_received
            .lock()
            .unwrap()
            .iter()
            .all(|n| n.title != "t2")
    );
    assert!(registry.is_subscribed("system"));
    assert_eq!(link.invoked("Unsubscribe", "system"), 0);
}

#[test]
fn test_one_shot_listener_may_unsubscribe_itself() {
    let link = RecordingLink::connected();
    let registry = Registry::new(link.clone());

    let hits = Arc::new(Mutex::new(Vec::new()));
    let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

    let hits_in = hits.clone();
    let slot_in = slot.clone();
    let sub = registry
        .subscribe(
            "system",
            Box::new(move |n: Notification| {
                hits_in.lock().unwrap().push(n);
                if let Some(own) = slot_in.lock().unwrap().take() {
                    own.unsubscribe();
                }
            }),
        )
        .unwrap();
    *slot.lock().unwrap() = Some(sub);

    registry.dispatch(notification("system", "t1", "b1"));
    registry.dispatch(notification("system", "t2", "b2"));

    assert_eq!(hits.lock().unwrap().len(), 1);
    assert!(!registry.is_subscribed("system"));
    assert_eq!(link.invoked("Unsubscribe", "system"), 1);
}

#[test]
fn test_notification_from_event_args() {
    let args = vec![
        serde_json::json!("system"),
        serde_json::json!("2026-08-26T10:00:00Z"),
        serde_json::json!("t1"),
        serde_json::json!("b1"),
    ];
    let n = Notification::from_event_args(&args).unwrap();
    assert_eq!(n.topic, "system");
    assert_eq!(n.title, "t1");
    assert_eq!(n.body, "b1");
    assert_eq!(n.timestamp.to_rfc3339(), "2026-08-26T10:00:00+00:00");
}

#[test]
fn test_notification_accepts_epoch_millis_timestamp() {
    let args = vec![
        serde_json::json!("system"),
        serde_json::json!(1_725_000_000_000_i64),
        serde_json::json!("t1"),
        serde_json::json!("b1"),
    ];
    let n = Notification::from_event_args(&args).unwrap();
    assert_eq!(n.timestamp.timestamp_millis(), 1_725_000_000_000);
}

#[test]
fn test_notification_rejects_malformed_events() {
    let too_short = vec![serde_json::json!("system")];
    assert!(matches!(
        Notification::from_event_args(&too_short),
        Err(HubError::MalformedEvent(_))
    ));

    let bad_timestamp = vec![
        serde_json::json!("system"),
        serde_json::json!("not a date"),
        serde_json::json!("t1"),
        serde_json::json!("b1"),
    ];
    assert!(matches!(
        Notification::from_event_args(&bad_timestamp),
        Err(HubError::MalformedEvent(_))
    ));
}
