//! Mock implementations for testing.
//!
//! - [`MockChunkSource`] - Scripted chunk delivery with recorded tasks

pub mod chunks;

pub use chunks::{ChunkSender, MockChunkSource, MockScript};
