//! Watch-to-phone peer sync
//!
//! The sync core: readings buffer locally as the sensor produces them,
//! and on request are delivered to the paired phone — one reading at a
//! time or as an ordered batch — over an unreliable wearable messaging
//! transport. Discovery prefers nodes advertising the companion-app
//! capability and falls back to any connected node; delivery tries
//! candidates in order until one send succeeds. No peer reachable is a
//! reported outcome, never an error.

pub mod buffer;
pub mod coordinator;
pub mod delivery;
pub mod directory;
pub mod receiver;

pub use buffer::ReadingBuffer;
pub use coordinator::{FlushOutcome, SyncCoordinator};
pub use delivery::{DeliveryEngine, DeliveryOutcome, PayloadKind};
pub use directory::PeerDirectory;
pub use receiver::{PhoneEvent, PhoneReceiver};

/// Capability tag the phone app advertises by default.
pub const DEFAULT_CAPABILITY: &str = "pulselink_phone_app";

/// Tuning knobs for the sync coordinator.
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Capability tag to look for during discovery.
    pub capability: String,
    /// Buffer depth of the reading subscriber channel.
    pub subscriber_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            capability: DEFAULT_CAPABILITY.to_string(),
            subscriber_capacity: 256,
        }
    }
}
