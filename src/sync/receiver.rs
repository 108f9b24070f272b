//! Phone-side message dispatcher
//!
//! Counterpart of the watch's delivery engine: the platform message
//! listener hands incoming (path, payload) pairs to `on_message`, which
//! decodes by path tag and fans the result out to subscribers. Unknown
//! paths and malformed payloads are logged and dropped; nothing here
//! propagates an error to the platform layer.

use tokio::sync::broadcast;

use crate::transport::{HEART_RATE_BATCH_PATH, HEART_RATE_PATH};
use crate::types::Reading;

/// A message that arrived from the watch.
#[derive(Clone, Debug)]
pub enum PhoneEvent {
    Single(Reading),
    Batch(Vec<Reading>),
}

pub struct PhoneReceiver {
    events_tx: broadcast::Sender<PhoneEvent>,
}

impl PhoneReceiver {
    pub fn new(capacity: usize) -> Self {
        let (events_tx, _) = broadcast::channel(capacity);
        Self { events_tx }
    }

    /// Subscribe to decoded events. Dropping the receiver unsubscribes.
    pub fn events(&self) -> broadcast::Receiver<PhoneEvent> {
        self.events_tx.subscribe()
    }

    /// Platform listener entry point: decode and dispatch one message.
    pub fn on_message(&self, path: &str, payload: &[u8]) {
        match path {
            HEART_RATE_PATH => match serde_json::from_slice::<Reading>(payload) {
                Ok(reading) => {
                    log::info!("Received reading from watch: {} bpm", reading.bpm);
                    let _ = self.events_tx.send(PhoneEvent::Single(reading));
                }
                Err(e) => log::warn!("Failed to parse reading: {}", e),
            },
            HEART_RATE_BATCH_PATH => match serde_json::from_slice::<Vec<Reading>>(payload) {
                Ok(batch) => {
                    log::info!("Received batch of {} readings from watch", batch.len());
                    let _ = self.events_tx.send(PhoneEvent::Batch(batch));
                }
                Err(e) => log::warn!("Failed to parse batch: {}", e),
            },
            other => log::warn!("Unknown message path: {}", other),
        }
    }
}

impl Default for PhoneReceiver {
    fn default() -> Self {
        Self::new(256)
    }
}
