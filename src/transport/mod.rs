//! Wearable messaging transport abstraction
//!
//! Defines the node-discovery and message-send traits the sync core is
//! built against, plus the wire path tags that distinguish single-reading
//! sends from batch sends. `simulated` provides an in-process
//! implementation for tests and demos.

pub mod simulated;

use async_trait::async_trait;
use thiserror::Error;

/// Path tag for a single-reading message.
pub const HEART_RATE_PATH: &str = "/heart_rate";

/// Path tag for a batched-readings message.
pub const HEART_RATE_BATCH_PATH: &str = "/heart_rate_batch";

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("Send error: {0}")]
    Send(String),

    #[error("Peer disconnected")]
    Disconnected,

    #[error("Operation timed out")]
    Timeout,
}

/// A transport-addressable device endpoint (here, a phone).
///
/// Transient: re-resolved on every delivery attempt and never cached
/// beyond one resolution call, because reachability changes over time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WearNode {
    /// Opaque transport-assigned identifier.
    pub id: String,
    /// Human-readable device name.
    pub display_name: String,
    /// Whether the node is directly reachable (e.g. over Bluetooth).
    pub is_nearby: bool,
    /// Whether the node advertises the companion-app capability.
    pub has_capability: bool,
}

/// Peer discovery: which nodes are visible right now.
#[async_trait]
pub trait NodeDiscovery: Send + Sync {
    /// Nodes advertising the given capability, reachable filter applied.
    async fn capable_nodes(&self, capability: &str) -> Result<Vec<WearNode>, TransportError>;

    /// All currently connected nodes, regardless of capability.
    async fn connected_nodes(&self) -> Result<Vec<WearNode>, TransportError>;
}

/// Message delivery: fire-and-forget send to one node.
///
/// The send completes when the transport confirms transmission; there is
/// no application-level acknowledgment beyond that. Timeout policy lives
/// inside the implementation.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(
        &self,
        node_id: &str,
        path: &str,
        payload: &[u8],
    ) -> Result<(), TransportError>;
}
