//! agentview - a console for a streaming code-generation pipeline.
//!
//! The library turns the pipeline's event-stream bytes into an epoch-guarded
//! view model; the binary renders it. Modules are public for integration
//! tests and benchmarks.

pub mod adapters;
pub mod cli;
pub mod cli_output;
pub mod config;
pub mod console;
pub mod error;
pub mod models;
pub mod session;
pub mod sse;
pub mod state;
pub mod traits;
