pub mod reading;

pub use reading::{Reading, ReadingBatch, ReadingStatus};
