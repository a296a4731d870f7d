//! Device session events and state.
//!
//! Transport callbacks are normalized into [`DeviceEvent`]s, queued, and
//! consumed in arrival order by a single session task.

use serde_json::{Value, json};

/// Body of the greeting published on the tenant test topic.
pub const GREETING: &str = "Hello from my computer-cum-IoT-device!";

/// One transport occurrence, in the order the transport reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// CONNACK accepted.
    Connected,
    /// SUBACK granted for this topic filter.
    Subscribed { topic: String },
    /// PUBLISH received.
    Message { topic: String, payload: Vec<u8> },
    /// Transport-level failure, including rejected subscriptions.
    Error(String),
    /// The transport is about to retry the connection.
    Reconnecting,
    /// The connection dropped.
    Disconnected,
    /// The transport shut down; no further events follow.
    Closed,
}

/// Where the session is in its per-connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No live connection.
    Offline,
    /// Connected, association not finished (or failed) on this connection.
    Connected,
    /// Association done, subscriptions issued.
    Ready,
    /// Transport closed.
    Closed,
}

/// Greeting payload for the tenant test topic.
#[must_use]
pub fn greeting(device_id: &str, timestamp_ms: i64) -> Value {
    json!({
        "device": device_id,
        "success": GREETING,
        "timestamp": timestamp_ms,
    })
}
