//! Stream sessions: epochs, consumption loops and cancellation.
//!
//! A [`StreamSession`] owns at most one current epoch. Each `start` bumps the
//! process-wide epoch counter and begins a fresh
//! ChunkSource → FrameSplitter → EventParser → PhaseReducer pipeline; any
//! older loop still draining its stream becomes a no-op.

mod cancel;
mod stream;
mod types;

use std::sync::{Mutex, MutexGuard};

pub use stream::StreamSession;
pub use types::{Diagnostics, SessionHandle, SessionOutcome, SessionStatus, SessionUpdate};

/// Lock, recovering the data if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
