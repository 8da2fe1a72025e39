//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`ChunkSource`] - Opens the pipeline's event stream for a task

pub mod chunk_source;

pub use chunk_source::{ChunkSource, ChunkStream, TransportError};
