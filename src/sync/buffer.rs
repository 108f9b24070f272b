//! Reading buffer
//!
//! In-memory ordered collection of readings awaiting delivery. Appended
//! to by the sensor callback, snapshotted by the coordinator for a flush,
//! and cleared only for the prefix a successful flush actually delivered
//! — readings appended while a send is in flight survive to the next
//! flush.

use tokio::sync::Mutex;

use crate::types::Reading;

pub struct ReadingBuffer {
    readings: Mutex<Vec<Reading>>,
}

impl ReadingBuffer {
    pub fn new() -> Self {
        Self {
            readings: Mutex::new(Vec::new()),
        }
    }

    /// Append a reading. Insertion order is delivery order.
    pub async fn push(&self, reading: Reading) {
        let mut readings = self.readings.lock().await;
        readings.push(reading);
    }

    pub async fn len(&self) -> usize {
        let readings = self.readings.lock().await;
        readings.len()
    }

    pub async fn is_empty(&self) -> bool {
        let readings = self.readings.lock().await;
        readings.is_empty()
    }

    /// Copy of the current contents, oldest first.
    pub async fn snapshot(&self) -> Vec<Reading> {
        let readings = self.readings.lock().await;
        readings.clone()
    }

    /// Drop the first `count` readings after a confirmed delivery.
    pub async fn discard_delivered(&self, count: usize) {
        let mut readings = self.readings.lock().await;
        let count = count.min(readings.len());
        readings.drain(..count);
    }
}

impl Default for ReadingBuffer {
    fn default() -> Self {
        Self::new()
    }
}
