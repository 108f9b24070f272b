// Pulselink - watch-to-phone heart-rate sync core

pub mod sync;
pub mod transport;
pub mod types;
