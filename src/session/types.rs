//! Types shared between the session loop and its subscribers.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::StreamError;
use crate::sse::{ParseFailure, ParseFailureKind};
use crate::state::Accumulator;

/// Coarse processing indicator for the most recent submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Nothing submitted yet.
    Idle,
    /// A stream is open and being consumed.
    Streaming,
    /// The stream ended normally.
    Completed,
    /// The transport failed; see the synthetic log entry.
    Failed,
    /// Cancelled by the caller or replaced by a newer submission.
    Cancelled,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Idle | SessionStatus::Streaming)
    }
}

/// Per-epoch counters collected by the consumption loop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    /// Complete frames extracted.
    pub frames: usize,
    /// Events that reached the accumulator.
    pub events_applied: usize,
    /// Frames without the data prefix.
    pub noise_frames: usize,
    /// Malformed-payload and unknown-phase failures, in stream order.
    pub failures: Vec<ParseFailure>,
    /// Chunks or events dropped because the epoch was no longer current.
    pub stale_discarded: usize,
    /// Undelimited bytes dropped at end of stream.
    pub truncated_bytes: usize,
}

impl Diagnostics {
    /// Record a frame-level failure. Noise is counted but not kept.
    pub fn record_failure(&mut self, failure: ParseFailure) {
        if failure.is_noise() {
            self.noise_frames += 1;
        } else {
            self.failures.push(failure);
        }
    }

    /// Number of recorded failures of one kind.
    pub fn failures_of(&self, kind: ParseFailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind() == kind).count()
    }
}

/// How one epoch ended.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub epoch: u64,
    pub status: SessionStatus,
    /// Set for transport failures, cancellation and supersession.
    pub error: Option<StreamError>,
    pub diagnostics: Diagnostics,
}

impl SessionOutcome {
    pub fn is_success(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}

/// Message delivered to subscribers.
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    /// A new epoch began; its empty snapshot follows.
    Started { epoch: u64 },
    /// Immutable state after an applied event.
    Snapshot(Arc<Accumulator>),
    /// An epoch reached a terminal state. Superseded epochs end
    /// without one.
    Finished(SessionOutcome),
}

/// Handle to one started submission.
#[derive(Debug)]
pub struct SessionHandle {
    pub(crate) epoch: u64,
    pub(crate) id: Uuid,
    pub(crate) join: JoinHandle<SessionOutcome>,
}

impl SessionHandle {
    /// Epoch this submission streams into.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Correlation id for logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Check if the consumption loop has exited.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Stop the consumption loop without waiting for its pending read.
    ///
    /// Pair with `cancel` so the epoch is marked inactive as well.
    pub fn abort(&self) {
        self.join.abort();
    }

    /// Wait for the consumption loop to exit.
    pub async fn wait(self) -> SessionOutcome {
        let epoch = self.epoch;
        match self.join.await {
            Ok(outcome) => outcome,
            Err(err) => {
                if err.is_cancelled() {
                    tracing::debug!(epoch, "Session task aborted");
                } else {
                    tracing::warn!(epoch, "Session task ended abnormally: {}", err);
                }
                SessionOutcome {
                    epoch,
                    status: SessionStatus::Cancelled,
                    error: Some(StreamError::Cancelled),
                    diagnostics: Diagnostics::default(),
                }
            }
        }
    }
}
