//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestChunkSource`] - Streams the generation endpoint over HTTP
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides [`mock::MockChunkSource`] for scripting
//! chunk boundaries, transport failures and supersession in tests.

pub mod mock;
pub mod reqwest_source;

pub use mock::{MockChunkSource, MockScript};
pub use reqwest_source::ReqwestChunkSource;
