//! WebSocket hub connection
//!
//! This file implements the client side of the hub transport. Responsibilities:
//! - Dial the hub and keep the session alive with periodic pings
//! - Forward outbound frames through a per-connection send loop
//! - Parse inbound frames and route named events to their bound handler
//! - Reconnect with a fixed backoff after an unexpected close
//!
//! The engine talks to this type only through the [`HubLink`] trait; `invoke`
//! enqueues a frame and returns immediately, so registry bookkeeping is never
//! suspended on network I/O.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::time::{interval, sleep};
use tokio_tungstenite::connect_async;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use super::message::{ClientFrame, ServerFrame};
use super::{EventHandler, HubLink};
use crate::utils::error::HubError;

/// Delays between reconnect attempts after an unexpected close. Once the
/// last attempt fails the connection stays down.
const RECONNECT_DELAY_SECS: [u64; 4] = [0, 2, 10, 30];

/// A WebSocket connection to the notification hub.
///
/// Built via [`HubConnectionBuilder`](super::HubConnectionBuilder). Event
/// handlers must be bound with [`on`](Self::on) and the connection marked
/// ready before [`connect`](Self::connect) does anything.
pub struct HubConnection {
    url: String,
    keepalive_interval: Duration,
    server_timeout: Duration,
    automatic_reconnect: bool,
    weak_self: Weak<HubConnection>,
    ready: AtomicBool,
    connected: AtomicBool,
    connecting: AtomicBool,
    // Bumped by every successful dial; session tasks carry the value they
    // were spawned under so a stale task cannot tear down its successor.
    session: AtomicU64,
    handlers: Mutex<HashMap<String, EventHandler>>,
    outbound: Mutex<Option<UnboundedSender<WsMessage>>>,
    last_inbound: Mutex<Instant>,
}

impl HubConnection {
    pub(crate) fn new(
        url: String,
        keepalive_interval: Duration,
        server_timeout: Duration,
        automatic_reconnect: bool,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            url,
            keepalive_interval,
            server_timeout,
            automatic_reconnect,
            weak_self: weak.clone(),
            ready: AtomicBool::new(false),
            connected: AtomicBool::new(false),
            connecting: AtomicBool::new(false),
            session: AtomicU64::new(0),
            handlers: Mutex::new(HashMap::new()),
            outbound: Mutex::new(None),
            last_inbound: Mutex::new(Instant::now()),
        })
    }

    /// Binds `handler` to a named inbound event. At most one handler may be
    /// bound per event name; rebinding fails with [`HubError::HandlerBound`].
    pub fn on(&self, event: &str, handler: EventHandler) -> Result<(), HubError> {
        let mut handlers = self.handlers.lock().unwrap();
        if handlers.contains_key(event) {
            return Err(HubError::HandlerBound(event.to_string()));
        }
        handlers.insert(event.to_string(), handler);
        Ok(())
    }

    /// Marks listener wiring as complete. `connect` refuses to dial before
    /// this is called.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    /// True once local handler wiring is complete.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// True while the transport session is established.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Establishes the transport session. A silent no-op when the connection
    /// is not ready, already connected, or another connect is in flight.
    pub async fn connect(&self) -> Result<(), HubError> {
        if !self.is_ready() {
            warn!("connect called before listener wiring completed");
            return Ok(());
        }
        if self.is_connected() {
            return Ok(());
        }
        if self.connecting.swap(true, Ordering::SeqCst) {
            debug!("connect already in flight");
            return Ok(());
        }
        let result = if self.is_connected() {
            Ok(())
        } else {
            self.establish().await
        };
        self.connecting.store(false, Ordering::SeqCst);
        result
    }

    /// Dials the hub and spawns the session tasks: a send loop draining the
    /// outbound channel, a read loop routing inbound frames, and a keepalive
    /// loop that pings the hub and watches the server timeout.
    async fn establish(&self) -> Result<(), HubError> {
        // Session tasks hold the connection by Arc; the constructor is the
        // only way to build one, so the upgrade cannot fail in practice.
        let Some(this) = self.weak_self.upgrade() else {
            return Err(HubError::ChannelClosed);
        };
        if self.is_connected() {
            return Ok(());
        }
        let (ws_stream, _) = connect_async(self.url.as_str()).await?;
        info!("connected to hub at {}", self.url);

        let session = self.session.fetch_add(1, Ordering::SeqCst) + 1;
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
        *self.outbound.lock().unwrap() = Some(tx);
        *self.last_inbound.lock().unwrap() = Instant::now();
        self.connected.store(true, Ordering::SeqCst);

        // Forward outbound frames to the socket.
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(e) = ws_sender.send(msg).await {
                    warn!("failed to send frame to hub: {e}");
                    break;
                }
            }
            debug!("send loop closed");
        });

        // Route inbound frames until the socket dies, then tear down and
        // possibly reconnect.
        let reader = this.clone();
        tokio::spawn(async move {
            while let Some(result) = ws_receiver.next().await {
                let msg = match result {
                    Ok(msg) => msg,
                    Err(e) => {
                        warn!("read error from hub: {e}");
                        break;
                    }
                };
                *reader.last_inbound.lock().unwrap() = Instant::now();
                match msg {
                    WsMessage::Text(text) => reader.handle_frame(&text),
                    WsMessage::Close(_) => break,
                    _ => {}
                }
            }

            if reader.teardown(session) {
                warn!("connection to hub lost");
                if reader.automatic_reconnect {
                    reader.clone().spawn_reconnect();
                }
            }
        });

        // Keepalive pings plus the server-timeout watchdog.
        let keeper = this;
        tokio::spawn(async move {
            let mut ticker = interval(keeper.keepalive_interval);
            ticker.tick().await; // the first tick fires immediately
            loop {
                ticker.tick().await;
                if keeper.session.load(Ordering::SeqCst) != session || !keeper.is_connected() {
                    break;
                }
                if keeper.last_inbound.lock().unwrap().elapsed() > keeper.server_timeout {
                    warn!(
                        "no traffic from hub for {:?}, closing connection",
                        keeper.server_timeout
                    );
                    // The read loop may be parked on a dead socket, so the
                    // watchdog has to tear the session down itself.
                    if keeper.teardown(session) && keeper.automatic_reconnect {
                        keeper.clone().spawn_reconnect();
                    }
                    break;
                }
                if keeper.send_frame(&ClientFrame::Ping).is_err() {
                    break;
                }
            }
        });

        Ok(())
    }

    /// Marks the session dead, drops its outbound channel, and nudges the
    /// socket shut with a close frame. Returns `false` when the session is
    /// stale or another task already tore it down, so teardown side effects
    /// run at most once per session.
    fn teardown(&self, session: u64) -> bool {
        if self.session.load(Ordering::SeqCst) != session {
            return false;
        }
        if !self.connected.swap(false, Ordering::SeqCst) {
            return false;
        }
        let sender = self.outbound.lock().unwrap().take();
        if let Some(sender) = sender {
            let _ = sender.send(WsMessage::Close(None));
        }
        true
    }

    fn spawn_reconnect(self: Arc<Self>) {
        tokio::spawn(async move {
            for (attempt, delay) in RECONNECT_DELAY_SECS.iter().enumerate() {
                sleep(Duration::from_secs(*delay)).await;
                info!("reconnect attempt {}", attempt + 1);
                match self.establish().await {
                    Ok(()) => {
                        info!("reconnected to hub");
                        return;
                    }
                    Err(e) => warn!("reconnect attempt {} failed: {e}", attempt + 1),
                }
            }
            warn!("giving up on reconnecting to the hub");
        });
    }

    fn handle_frame(&self, text: &str) {
        match serde_json::from_str::<ServerFrame>(text) {
            Ok(ServerFrame::Event { target, arguments }) => {
                let handlers = self.handlers.lock().unwrap();
                match handlers.get(&target) {
                    Some(handler) => handler(&arguments),
                    None => debug!("no handler bound for event '{target}'"),
                }
            }
            Ok(ServerFrame::Ping) => {
                if let Err(e) = self.send_frame(&ClientFrame::Pong) {
                    debug!("failed to answer hub ping: {e}");
                }
            }
            Ok(ServerFrame::Pong) => {}
            Err(e) => warn!("invalid frame from hub: {e} | {text}"),
        }
    }

    fn send_frame(&self, frame: &ClientFrame) -> Result<(), HubError> {
        let text = serde_json::to_string(frame)?;
        let guard = self.outbound.lock().unwrap();
        let sender = guard.as_ref().ok_or(HubError::NotConnected)?;
        sender
            .send(WsMessage::Text(text.into()))
            .map_err(|_| HubError::ChannelClosed)
    }
}

impl HubLink for HubConnection {
    fn is_ready(&self) -> bool {
        HubConnection::is_ready(self)
    }

    fn is_connected(&self) -> bool {
        HubConnection::is_connected(self)
    }

    fn invoke(&self, target: &str, arguments: Vec<Value>) -> Result<(), HubError> {
        if !self.is_connected() {
            return Err(HubError::NotConnected);
        }
        self.send_frame(&ClientFrame::Invoke {
            target: target.to_string(),
            arguments,
        })
    }
}
