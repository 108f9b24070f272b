//! Sync coordinator
//!
//! The application-facing surface of the sync core. Readings arrive
//! through `on_reading` and accumulate in the buffer; `send_now` ships a
//! single reading immediately (fire-and-forget, no buffering on
//! failure); `flush` ships everything buffered as one ordered batch and
//! clears only what was actually delivered. `check_connection` and
//! `count_peers` are read-only directory probes.
//!
//! Every operation is one async unit of work: it resolves peers, walks
//! the fallback loop, and completes with a definite outcome. Transport
//! errors never escape this layer. Flushes are serialized by a gate so
//! two concurrent flushes cannot drain the same batch.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use crate::sync::{DeliveryEngine, PayloadKind, PeerDirectory, ReadingBuffer, SyncConfig};
use crate::transport::{MessageSender, NodeDiscovery};
use crate::types::Reading;

/// Result of a flush. "Nothing to send" and "send failed" are distinct
/// outcomes, not one boolean.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushOutcome {
    /// A batch of this many readings reached the phone.
    Delivered(usize),
    /// The buffer was empty; the transport was not touched.
    NothingToSend,
    /// Delivery failed; the buffered readings were retained.
    Failed,
}

impl FlushOutcome {
    /// Collapsed boolean view: an empty buffer reads as `false`, the
    /// same as a failed send.
    pub fn delivered(&self) -> bool {
        matches!(self, FlushOutcome::Delivered(_))
    }
}

pub struct SyncCoordinator {
    directory: PeerDirectory,
    engine: DeliveryEngine,
    buffer: ReadingBuffer,
    /// Serializes whole flushes: snapshot, send, and clear happen under
    /// one guard so concurrent flushes cannot race on the same batch.
    flush_gate: Mutex<()>,
    last_reading: Mutex<Option<Reading>>,
    readings_tx: broadcast::Sender<Reading>,
}

impl SyncCoordinator {
    pub fn new(
        discovery: Arc<dyn NodeDiscovery>,
        sender: Arc<dyn MessageSender>,
        config: SyncConfig,
    ) -> Self {
        let (readings_tx, _) = broadcast::channel(config.subscriber_capacity);
        Self {
            directory: PeerDirectory::new(discovery, config.capability),
            engine: DeliveryEngine::new(sender),
            buffer: ReadingBuffer::new(),
            flush_gate: Mutex::new(()),
            last_reading: Mutex::new(None),
            readings_tx,
        }
    }

    /// Sensor callback: buffer the reading, remember it as the latest,
    /// and forward it to live subscribers.
    pub async fn on_reading(&self, reading: Reading) {
        self.buffer.push(reading.clone()).await;
        *self.last_reading.lock().await = Some(reading.clone());
        // No live subscribers is fine; the reading stays buffered.
        let _ = self.readings_tx.send(reading);
    }

    /// Subscribe to the live reading stream. Dropping the receiver
    /// unsubscribes.
    pub fn readings(&self) -> broadcast::Receiver<Reading> {
        self.readings_tx.subscribe()
    }

    /// Most recent reading seen, if any.
    pub async fn last_reading(&self) -> Option<Reading> {
        self.last_reading.lock().await.clone()
    }

    /// Number of readings currently buffered.
    pub async fn buffered(&self) -> usize {
        self.buffer.len().await
    }

    /// Ship one reading immediately. Does not buffer on failure — the
    /// caller decides whether to re-queue.
    pub async fn send_now(&self, reading: &Reading) -> bool {
        let payload = match serde_json::to_vec(reading) {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("Failed to serialize reading: {}", e);
                return false;
            }
        };
        let peers = self.directory.resolve().await;
        self.engine
            .deliver(&payload, PayloadKind::Single, &peers)
            .await
            .success
    }

    /// Ship everything buffered as one ordered batch. On success the
    /// delivered prefix is cleared; on failure the readings stay
    /// buffered for a later attempt (at-least-once semantics).
    pub async fn flush(&self) -> FlushOutcome {
        let _gate = self.flush_gate.lock().await;

        let batch = self.buffer.snapshot().await;
        if batch.is_empty() {
            log::info!("Flush requested with nothing buffered");
            return FlushOutcome::NothingToSend;
        }

        let payload = match serde_json::to_vec(&batch) {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("Failed to serialize batch: {}", e);
                return FlushOutcome::Failed;
            }
        };

        log::info!("Flushing {} buffered readings", batch.len());
        let peers = self.directory.resolve().await;
        let outcome = self
            .engine
            .deliver(&payload, PayloadKind::Batch, &peers)
            .await;

        if outcome.success {
            // Readings appended while the send was in flight fall past
            // this prefix and survive for the next flush.
            self.buffer.discard_delivered(batch.len()).await;
            FlushOutcome::Delivered(batch.len())
        } else {
            log::warn!("Flush failed, {} readings retained", batch.len());
            FlushOutcome::Failed
        }
    }

    /// Whether any peer is currently reachable. Read-only: never
    /// touches the buffer, never triggers delivery.
    pub async fn check_connection(&self) -> bool {
        !self.directory.resolve().await.is_empty()
    }

    /// How many candidate peers are currently visible. Read-only.
    pub async fn count_peers(&self) -> usize {
        self.directory.resolve().await.len()
    }
}
