//! # notimux
//!
//! `notimux` is a client-side notification multiplexer. It holds one logical
//! WebSocket connection to a push-notification hub and exposes a topic-based
//! publish/subscribe API on top of it, so that any number of local listeners
//! can share a single network-level subscription per topic.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `mux`: The multiplexing engine that maps topics to streams, reference-counts
//!   listeners, and decides when a network subscribe/unsubscribe call is issued.
//! - `hub`: The connection adapter: the `HubLink` contract the engine depends on,
//!   plus a WebSocket implementation with keepalive and automatic reconnect.
//! - `config`: Handles loading and managing client configuration.
//! - `utils`: Contains shared utilities, such as error handling and logging setup.

pub mod config;
pub mod hub;
pub mod mux;
pub mod utils;

pub use hub::{HubConnection, HubConnectionBuilder, HubLink};
pub use mux::{Multiplexer, Notification, Subscription};
pub use utils::error::HubError;
