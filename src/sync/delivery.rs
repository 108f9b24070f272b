//! Delivery engine
//!
//! Attempts delivery of one payload to one peer, falling back across
//! candidates in directory order. The first successful send wins; a
//! failed send is logged and the next candidate tried. No retry or
//! backoff happens inside one call — re-invoking later (or buffering)
//! is the caller's job.

use std::sync::Arc;

use crate::transport::{MessageSender, WearNode, HEART_RATE_BATCH_PATH, HEART_RATE_PATH};

/// Which wire path a payload travels on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    /// One reading, `/heart_rate`.
    Single,
    /// A batch of readings, `/heart_rate_batch`.
    Batch,
}

impl PayloadKind {
    pub fn path(&self) -> &'static str {
        match self {
            PayloadKind::Single => HEART_RATE_PATH,
            PayloadKind::Batch => HEART_RATE_BATCH_PATH,
        }
    }
}

/// Result of one delivery attempt.
#[derive(Clone, Debug)]
pub struct DeliveryOutcome {
    pub success: bool,
    /// Peer the payload actually reached, when successful.
    pub attempted_peer_id: Option<String>,
    pub failure_reason: Option<String>,
}

impl DeliveryOutcome {
    fn delivered(peer_id: &str) -> Self {
        Self {
            success: true,
            attempted_peer_id: Some(peer_id.to_string()),
            failure_reason: None,
        }
    }

    fn failed(reason: &str) -> Self {
        Self {
            success: false,
            attempted_peer_id: None,
            failure_reason: Some(reason.to_string()),
        }
    }
}

pub struct DeliveryEngine {
    sender: Arc<dyn MessageSender>,
}

impl DeliveryEngine {
    pub fn new(sender: Arc<dyn MessageSender>) -> Self {
        Self { sender }
    }

    /// Try candidates in the order the directory supplied them; stop at
    /// the first successful send.
    pub async fn deliver(
        &self,
        payload: &[u8],
        kind: PayloadKind,
        peers: &[WearNode],
    ) -> DeliveryOutcome {
        if peers.is_empty() {
            log::warn!("No peer reachable, dropping {} delivery", kind.path());
            return DeliveryOutcome::failed("no peer reachable");
        }

        for peer in peers {
            log::info!(
                "Attempting {} send to {} ({})",
                kind.path(),
                peer.display_name,
                peer.id
            );
            match self.sender.send_message(&peer.id, kind.path(), payload).await {
                Ok(()) => {
                    log::info!("Message sent to {}", peer.display_name);
                    return DeliveryOutcome::delivered(&peer.id);
                }
                Err(e) => {
                    log::warn!("Send to {} failed: {}", peer.display_name, e);
                }
            }
        }

        log::error!("All {} candidate nodes failed", peers.len());
        DeliveryOutcome::failed("all candidates failed")
    }
}
