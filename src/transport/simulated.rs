//! In-process wearable network simulator
//!
//! Stands in for the vendor messaging transport: nodes can be registered
//! and removed at runtime, sends land in per-node inboxes, and both
//! discovery stages and individual sends can be made to fail. Query and
//! send counters let tests assert which transport calls were made.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{MessageSender, NodeDiscovery, TransportError, WearNode};

struct SimNodeState {
    node: WearNode,
    /// Capability tag this node advertises, if any.
    capability: Option<String>,
    /// When set, sends to this node fail at the transport layer.
    fail_sends: bool,
    /// Messages delivered to this node: (path, payload).
    inbox: Vec<(String, Vec<u8>)>,
}

/// The simulated "air": a registry of reachable nodes shared by the
/// discovery and send sides of the transport.
pub struct SimWearNetwork {
    nodes: Mutex<Vec<SimNodeState>>,
    capable_queries: AtomicUsize,
    connected_queries: AtomicUsize,
    send_attempts: AtomicUsize,
    fail_capable_queries: AtomicBool,
    fail_connected_queries: AtomicBool,
}

impl SimWearNetwork {
    /// Create a new simulated network with no nodes registered.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            nodes: Mutex::new(Vec::new()),
            capable_queries: AtomicUsize::new(0),
            connected_queries: AtomicUsize::new(0),
            send_attempts: AtomicUsize::new(0),
            fail_capable_queries: AtomicBool::new(false),
            fail_connected_queries: AtomicBool::new(false),
        })
    }

    /// Register a node and return its generated id.
    pub async fn add_node(
        &self,
        display_name: &str,
        is_nearby: bool,
        capability: Option<&str>,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        let mut nodes = self.nodes.lock().await;
        nodes.push(SimNodeState {
            node: WearNode {
                id: id.clone(),
                display_name: display_name.to_string(),
                is_nearby,
                has_capability: capability.is_some(),
            },
            capability: capability.map(str::to_string),
            fail_sends: false,
            inbox: Vec::new(),
        });
        id
    }

    /// Remove a node, as if it went out of range.
    pub async fn remove_node(&self, id: &str) {
        let mut nodes = self.nodes.lock().await;
        nodes.retain(|state| state.node.id != id);
    }

    /// Make sends to one node fail (or succeed again).
    pub async fn set_send_failure(&self, id: &str, fail: bool) {
        let mut nodes = self.nodes.lock().await;
        if let Some(state) = nodes.iter_mut().find(|state| state.node.id == id) {
            state.fail_sends = fail;
        }
    }

    /// Make capability-stage discovery fail at the transport layer.
    pub fn fail_capable_queries(&self, fail: bool) {
        self.fail_capable_queries.store(fail, Ordering::SeqCst);
    }

    /// Make connected-nodes discovery fail at the transport layer.
    pub fn fail_connected_queries(&self, fail: bool) {
        self.fail_connected_queries.store(fail, Ordering::SeqCst);
    }

    /// Messages delivered to a node so far: (path, payload).
    pub async fn inbox(&self, id: &str) -> Vec<(String, Vec<u8>)> {
        let nodes = self.nodes.lock().await;
        nodes
            .iter()
            .find(|state| state.node.id == id)
            .map(|state| state.inbox.clone())
            .unwrap_or_default()
    }

    pub fn capable_query_count(&self) -> usize {
        self.capable_queries.load(Ordering::SeqCst)
    }

    pub fn connected_query_count(&self) -> usize {
        self.connected_queries.load(Ordering::SeqCst)
    }

    pub fn send_attempt_count(&self) -> usize {
        self.send_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeDiscovery for SimWearNetwork {
    async fn capable_nodes(&self, capability: &str) -> Result<Vec<WearNode>, TransportError> {
        self.capable_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_capable_queries.load(Ordering::SeqCst) {
            return Err(TransportError::Discovery(
                "simulated capability query outage".to_string(),
            ));
        }
        let nodes = self.nodes.lock().await;
        Ok(nodes
            .iter()
            .filter(|state| state.capability.as_deref() == Some(capability))
            .map(|state| state.node.clone())
            .collect())
    }

    async fn connected_nodes(&self) -> Result<Vec<WearNode>, TransportError> {
        self.connected_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_connected_queries.load(Ordering::SeqCst) {
            return Err(TransportError::Discovery(
                "simulated node query outage".to_string(),
            ));
        }
        let nodes = self.nodes.lock().await;
        Ok(nodes.iter().map(|state| state.node.clone()).collect())
    }
}

#[async_trait]
impl MessageSender for SimWearNetwork {
    async fn send_message(
        &self,
        node_id: &str,
        path: &str,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        self.send_attempts.fetch_add(1, Ordering::SeqCst);
        let mut nodes = self.nodes.lock().await;
        let state = nodes
            .iter_mut()
            .find(|state| state.node.id == node_id)
            .ok_or(TransportError::Disconnected)?;
        if state.fail_sends {
            return Err(TransportError::Send(format!(
                "simulated send failure to {}",
                state.node.display_name
            )));
        }
        state.inbox.push((path.to_string(), payload.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capable_query_filters_by_tag() {
        let network = SimWearNetwork::new();
        network.add_node("Phone", true, Some("fit_app")).await;
        network.add_node("Tablet", true, Some("other_app")).await;
        network.add_node("Earbuds", true, None).await;

        let capable = network.capable_nodes("fit_app").await.unwrap();
        assert_eq!(capable.len(), 1);
        assert_eq!(capable[0].display_name, "Phone");

        let all = network.connected_nodes().await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_send_lands_in_inbox() {
        let network = SimWearNetwork::new();
        let id = network.add_node("Phone", true, None).await;

        network.send_message(&id, "/p", b"hello").await.unwrap();

        let inbox = network.inbox(&id).await;
        assert_eq!(inbox, vec![("/p".to_string(), b"hello".to_vec())]);
        assert_eq!(network.send_attempt_count(), 1);
    }

    #[tokio::test]
    async fn test_send_to_unknown_node_is_disconnected() {
        let network = SimWearNetwork::new();
        let result = network.send_message("nope", "/p", b"x").await;
        assert!(matches!(result, Err(TransportError::Disconnected)));
    }

    #[tokio::test]
    async fn test_send_failure_injection() {
        let network = SimWearNetwork::new();
        let id = network.add_node("Phone", true, None).await;
        network.set_send_failure(&id, true).await;

        let result = network.send_message(&id, "/p", b"x").await;
        assert!(matches!(result, Err(TransportError::Send(_))));
        assert!(network.inbox(&id).await.is_empty());
    }

    #[tokio::test]
    async fn test_discovery_failure_injection() {
        let network = SimWearNetwork::new();
        network.add_node("Phone", true, Some("fit_app")).await;
        network.fail_capable_queries(true);
        network.fail_connected_queries(true);

        assert!(network.capable_nodes("fit_app").await.is_err());
        assert!(network.connected_nodes().await.is_err());

        network.fail_capable_queries(false);
        assert_eq!(network.capable_nodes("fit_app").await.unwrap().len(), 1);
    }
}
