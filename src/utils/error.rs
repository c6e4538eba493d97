//! The `error` module defines the error types used within the `notimux` crate.
//!
//! Network-call failures are reported through these variants but are never
//! retried here, and a failed Subscribe invoke does not roll back local
//! listener state. Local bookkeeping anomalies (double unsubscribe, dispatch
//! to an unknown topic) are absorbed as no-ops and never reach this type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
    /// The transport handshake has not completed, so remote calls are refused.
    #[error("not connected to the hub")]
    NotConnected,

    /// A handler is already bound for the named inbound event. The hub
    /// allows at most one handler per event name.
    #[error("a handler is already bound for event '{0}'")]
    HandlerBound(String),

    /// The outbound channel to the send loop has closed, usually because the
    /// connection died between the connectivity check and the send.
    #[error("outbound channel closed")]
    ChannelClosed,

    /// A frame could not be encoded as JSON before sending.
    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),

    /// An inbound notification event did not carry the expected arguments.
    #[error("malformed notification event: {0}")]
    MalformedEvent(String),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
}
