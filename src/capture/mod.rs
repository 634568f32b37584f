//! Audio capture implementations
//!
//! Encoders that plug into the recording coordinator.

pub mod feed;

pub use feed::{ChunkFeed, FeedEncoder};
