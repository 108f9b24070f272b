//! Peer directory
//!
//! Resolves the current set of reachable transport nodes. Nodes
//! advertising the companion-app capability are strictly preferred —
//! they are confirmed to run the phone app. When none advertise it, the
//! directory falls back to all connected nodes, since a reachable node
//! may simply not have advertised capability yet. Transport failures at
//! either stage are logged and treated as zero nodes found at that
//! stage; an empty result means "no peer reachable", never an error.

use std::cmp::Reverse;
use std::sync::Arc;

use crate::transport::{NodeDiscovery, WearNode};

pub struct PeerDirectory {
    discovery: Arc<dyn NodeDiscovery>,
    capability: String,
}

impl PeerDirectory {
    pub fn new(discovery: Arc<dyn NodeDiscovery>, capability: String) -> Self {
        Self {
            discovery,
            capability,
        }
    }

    /// Resolve delivery candidates, ordered by
    /// `(has_capability desc, is_nearby desc)`.
    pub async fn resolve(&self) -> Vec<WearNode> {
        let mut nodes = match self.discovery.capable_nodes(&self.capability).await {
            Ok(nodes) => nodes,
            Err(e) => {
                log::warn!("Capability discovery failed: {}", e);
                Vec::new()
            }
        };

        if nodes.is_empty() {
            log::info!(
                "No nodes advertising '{}', falling back to all connected nodes",
                self.capability
            );
            nodes = match self.discovery.connected_nodes().await {
                Ok(nodes) => nodes,
                Err(e) => {
                    log::warn!("Connected-nodes discovery failed: {}", e);
                    Vec::new()
                }
            };
        }

        if nodes.is_empty() {
            log::warn!("No connected nodes - phone may not be paired");
        } else {
            for node in &nodes {
                log::info!(
                    "Candidate node: {} (id: {}, nearby: {}, capable: {})",
                    node.display_name,
                    node.id,
                    node.is_nearby,
                    node.has_capability
                );
            }
        }

        nodes.sort_by_key(|node| (Reverse(node.has_capability), Reverse(node.is_nearby)));
        nodes
    }

    /// First capability-qualified node, if any.
    pub async fn preferred_peer(&self) -> Option<WearNode> {
        match self.discovery.capable_nodes(&self.capability).await {
            Ok(nodes) => nodes.into_iter().next(),
            Err(e) => {
                log::warn!("Capability discovery failed: {}", e);
                None
            }
        }
    }
}
