//! View-model state
//!
//! - Accumulator: everything known about the current submission
//! - reducer: per-phase merge rules and the epoch guard

pub mod accumulator;
pub mod reducer;

pub use accumulator::Accumulator;
pub use reducer::{apply_event, apply_tagged, reduce, ApplyOutcome, TaggedEvent};
