//! types/reading.rs
//!
//! Defines the Reading struct produced by the heart-rate sensor and the
//! ReadingBatch alias used when buffered readings are delivered as one
//! payload. Readings are immutable once created; JSON is the wire encoding.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Sensor-reported quality of a reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStatus {
    /// Sensor contact was good and the value is trustworthy.
    Reliable,
    /// Value was produced but sensor contact was poor.
    Unreliable,
    /// Sensor lost skin contact during measurement.
    SensorDetached,
}

/// One heart-rate measurement with its inter-beat intervals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// Heart rate in beats per minute.
    pub bpm: u32,
    /// Inter-beat intervals in milliseconds, in measurement order.
    pub ibi_ms: Vec<u32>,
    /// Measurement time, epoch milliseconds.
    pub timestamp: i64,
    pub status: ReadingStatus,
}

impl Reading {
    /// Create a reading stamped with the current time.
    pub fn new(bpm: u32, ibi_ms: Vec<u32>, status: ReadingStatus) -> Self {
        Self {
            bpm,
            ibi_ms,
            timestamp: Utc::now().timestamp_millis(),
            status,
        }
    }

    /// Create a reading with an explicit timestamp.
    pub fn at(bpm: u32, ibi_ms: Vec<u32>, timestamp: i64, status: ReadingStatus) -> Self {
        Self {
            bpm,
            ibi_ms,
            timestamp,
            status,
        }
    }
}

/// An ordered group of buffered readings sent as one payload.
/// Insertion order is collection order (chronological).
pub type ReadingBatch = Vec<Reading>;
