//! Session start and the per-epoch consumption loop.
//!
//! Each `start` allocates a fresh epoch, swaps in an empty accumulator and
//! spawns one loop that pulls chunks, decodes frames and folds events. The
//! loop holds no authority of its own: before touching state it checks that
//! its epoch is still the current, active one. A read that is already pending
//! when the epoch goes stale is allowed to finish; its chunk is then dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use super::lock;
use super::types::{Diagnostics, SessionHandle, SessionOutcome, SessionStatus, SessionUpdate};
use crate::error::StreamError;
use crate::sse::{Event, EventDecoder, ParseFailure};
use crate::state::{apply_tagged, Accumulator, ApplyOutcome, TaggedEvent};
use crate::traits::{ChunkSource, TransportError};

/// Process-wide epoch counter. Epoch 0 is the idle placeholder.
static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

fn next_epoch() -> u64 {
    NEXT_EPOCH.fetch_add(1, Ordering::SeqCst)
}

/// State shared between the session, its loops and `cancel`.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) epoch: u64,
    pub(crate) active: bool,
    pub(crate) state: Arc<Accumulator>,
    pub(crate) status: SessionStatus,
    /// Set by `cancel` for the current epoch; each loop keeps its own copy.
    pub(crate) cancelled: Arc<AtomicBool>,
    subscribers: Vec<mpsc::UnboundedSender<SessionUpdate>>,
}

impl Shared {
    fn new() -> Self {
        Self {
            epoch: 0,
            active: false,
            state: Arc::new(Accumulator::new(0)),
            status: SessionStatus::Idle,
            cancelled: Arc::new(AtomicBool::new(false)),
            subscribers: Vec::new(),
        }
    }

    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch && self.active
    }

    /// Send to every subscriber, dropping the ones that hung up.
    fn broadcast(&mut self, update: SessionUpdate) {
        self.subscribers.retain(|tx| tx.send(update.clone()).is_ok());
    }

    fn publish_snapshot(&mut self) {
        let snapshot = Arc::clone(&self.state);
        self.broadcast(SessionUpdate::Snapshot(snapshot));
    }
}

/// Owns the current epoch and its accumulator.
///
/// Starting a new task never waits for the previous stream: the old loop is
/// superseded at once and anything it still reads is discarded. The old
/// stream is closed after its next delivery.
///
/// # Example
///
/// ```ignore
/// use agentview::adapters::ReqwestChunkSource;
/// use agentview::session::{SessionUpdate, StreamSession};
///
/// let session = StreamSession::new(ReqwestChunkSource::from_config(&config)?);
/// let mut updates = session.subscribe();
/// let handle = session.start("write a sorting function")?;
///
/// while let Some(update) = updates.recv().await {
///     if let SessionUpdate::Finished(outcome) = update {
///         println!("{:?}", outcome.status);
///         break;
///     }
/// }
/// ```
pub struct StreamSession<S> {
    source: Arc<S>,
    pub(crate) shared: Arc<Mutex<Shared>>,
}

impl<S> Clone for StreamSession<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S> StreamSession<S> {
    /// Subscribe to state updates.
    ///
    /// A subscriber that joins after a start receives the current snapshot
    /// first.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut shared = lock(&self.shared);
        if shared.epoch != 0 {
            let _ = tx.send(SessionUpdate::Snapshot(Arc::clone(&shared.state)));
        }
        shared.subscribers.push(tx);
        rx
    }

    /// Latest immutable state.
    pub fn snapshot(&self) -> Arc<Accumulator> {
        Arc::clone(&lock(&self.shared).state)
    }

    /// Epoch of the most recent start, or 0 before the first.
    pub fn current_epoch(&self) -> u64 {
        lock(&self.shared).epoch
    }

    pub fn status(&self) -> SessionStatus {
        lock(&self.shared).status
    }

    /// Check if a stream is currently being consumed.
    pub fn is_streaming(&self) -> bool {
        lock(&self.shared).active
    }
}

impl<S: ChunkSource + 'static> StreamSession<S> {
    pub fn new(source: S) -> Self {
        Self::with_source(Arc::new(source))
    }

    /// Create a session around an already shared source.
    pub fn with_source(source: Arc<S>) -> Self {
        Self {
            source,
            shared: Arc::new(Mutex::new(Shared::new())),
        }
    }

    /// Submit a task, superseding any stream still in flight.
    ///
    /// Blank tasks are rejected without touching the current epoch.
    /// Must be called from within a tokio runtime.
    pub fn start(&self, task: &str) -> Result<SessionHandle, StreamError> {
        let task = task.trim();
        if task.is_empty() {
            return Err(StreamError::EmptyTask);
        }

        let epoch = next_epoch();
        let id = Uuid::new_v4();
        let cancelled = Arc::new(AtomicBool::new(false));

        {
            let mut shared = lock(&self.shared);
            if shared.active {
                debug!(
                    old_epoch = shared.epoch,
                    new_epoch = epoch,
                    "Superseding active session"
                );
            }
            shared.epoch = epoch;
            shared.active = true;
            shared.state = Arc::new(Accumulator::new(epoch));
            shared.status = SessionStatus::Streaming;
            shared.cancelled = Arc::clone(&cancelled);
            shared.broadcast(SessionUpdate::Started { epoch });
            shared.publish_snapshot();
        }

        info!(epoch, session_id = %id, "Starting session");

        let run = EpochRun {
            epoch,
            shared: Arc::clone(&self.shared),
            cancelled,
            decoder: EventDecoder::new(),
            diagnostics: Diagnostics::default(),
        };
        let join = tokio::spawn(run.drive(Arc::clone(&self.source), task.to_string()));

        Ok(SessionHandle { epoch, id, join })
    }
}

/// One epoch's consumption loop.
struct EpochRun {
    epoch: u64,
    shared: Arc<Mutex<Shared>>,
    cancelled: Arc<AtomicBool>,
    decoder: EventDecoder,
    diagnostics: Diagnostics,
}

impl EpochRun {
    async fn drive<S: ChunkSource>(mut self, source: Arc<S>, task: String) -> SessionOutcome {
        let mut stream = match source.open(&task).await {
            Ok(stream) => stream,
            Err(err) => {
                warn!(epoch = self.epoch, "Failed to open stream: {}", err);
                let error = StreamError::OpenFailed {
                    source: err.clone(),
                };
                return self.fail(error, &err);
            }
        };
        if !self.is_current() {
            return self.finish_stale();
        }

        loop {
            match stream.next().await {
                Some(Ok(chunk)) => {
                    if !self.apply_chunk(&chunk) {
                        return self.finish_stale();
                    }
                }
                Some(Err(err)) => {
                    warn!(epoch = self.epoch, "Stream failed: {}", err);
                    let error = StreamError::ConnectionLost {
                        source: err.clone(),
                    };
                    return self.fail(error, &err);
                }
                None => return self.complete(),
            }
        }
    }

    fn is_current(&self) -> bool {
        lock(&self.shared).is_current(self.epoch)
    }

    /// Decode one chunk and fold its events. Returns false if the epoch is
    /// no longer current, in which case the chunk is discarded whole.
    fn apply_chunk(&mut self, chunk: &[u8]) -> bool {
        let shared = Arc::clone(&self.shared);
        let mut shared = lock(&shared);
        if !shared.is_current(self.epoch) {
            self.diagnostics.stale_discarded += 1;
            trace!(epoch = self.epoch, "Discarding chunk for stale epoch");
            return false;
        }

        for result in self.decoder.feed(chunk) {
            self.diagnostics.frames += 1;
            match result {
                Ok(event) => self.apply(&mut shared, event),
                Err(failure) => self.record(failure),
            }
        }
        true
    }

    fn apply(&mut self, shared: &mut Shared, event: Event) {
        let phase = event.phase();
        let tagged = TaggedEvent::new(self.epoch, event);
        match apply_tagged(Arc::make_mut(&mut shared.state), tagged) {
            ApplyOutcome::Applied => {
                self.diagnostics.events_applied += 1;
                trace!(epoch = self.epoch, %phase, "Applied event");
                shared.publish_snapshot();
            }
            ApplyOutcome::Stale => {
                self.diagnostics.stale_discarded += 1;
                trace!(epoch = self.epoch, %phase, "Discarding stale event");
            }
        }
    }

    fn record(&mut self, failure: ParseFailure) {
        if failure.is_noise() {
            trace!(epoch = self.epoch, "Skipping non-data frame");
        } else {
            warn!(
                epoch = self.epoch,
                kind = failure.kind().as_str(),
                "Dropping frame: {}",
                failure
            );
        }
        self.diagnostics.record_failure(failure);
    }

    fn take_tail(&mut self) {
        let dropped = self.decoder.finish();
        if dropped > 0 {
            debug!(
                epoch = self.epoch,
                bytes = dropped,
                "Dropped undelimited tail at end of stream"
            );
        }
        self.diagnostics.truncated_bytes = dropped;
    }

    /// End of stream.
    fn complete(mut self) -> SessionOutcome {
        self.take_tail();

        let shared = Arc::clone(&self.shared);
        let mut shared = lock(&shared);
        if !shared.is_current(self.epoch) {
            return self.stale_outcome(&mut shared);
        }

        shared.active = false;
        shared.status = SessionStatus::Completed;
        let outcome = self.outcome(SessionStatus::Completed, None);
        shared.broadcast(SessionUpdate::Finished(outcome.clone()));
        info!(
            epoch = self.epoch,
            events = outcome.diagnostics.events_applied,
            failures = outcome.diagnostics.failures.len(),
            "Session completed"
        );
        outcome
    }

    /// Transport failure: one synthetic log entry, then stop.
    fn fail(mut self, error: StreamError, cause: &TransportError) -> SessionOutcome {
        self.take_tail();

        let shared = Arc::clone(&self.shared);
        let mut shared = lock(&shared);
        if !shared.is_current(self.epoch) {
            return self.stale_outcome(&mut shared);
        }

        let line = format!("System Error: {}", cause);
        self.apply(&mut shared, Event::Log(line));

        shared.active = false;
        shared.status = SessionStatus::Failed;
        let outcome = self.outcome(SessionStatus::Failed, Some(error));
        shared.broadcast(SessionUpdate::Finished(outcome.clone()));
        info!(epoch = self.epoch, "Session failed");
        outcome
    }

    fn finish_stale(self) -> SessionOutcome {
        let shared = Arc::clone(&self.shared);
        let mut shared = lock(&shared);
        self.stale_outcome(&mut shared)
    }

    /// Outcome for a loop that found its epoch cancelled or replaced.
    /// A cancelled epoch is announced even if a newer one has started since;
    /// a superseded epoch ends silently.
    fn stale_outcome(&self, shared: &mut Shared) -> SessionOutcome {
        if self.cancelled.load(Ordering::SeqCst) {
            let outcome = self.outcome(SessionStatus::Cancelled, Some(StreamError::Cancelled));
            shared.broadcast(SessionUpdate::Finished(outcome.clone()));
            info!(epoch = self.epoch, "Session stopped after cancel");
            outcome
        } else {
            trace!(
                epoch = self.epoch,
                current = shared.epoch,
                "Superseded session stopped"
            );
            self.outcome(
                SessionStatus::Cancelled,
                Some(StreamError::Superseded {
                    by_epoch: shared.epoch,
                }),
            )
        }
    }

    fn outcome(&self, status: SessionStatus, error: Option<StreamError>) -> SessionOutcome {
        SessionOutcome {
            epoch: self.epoch,
            status,
            error,
            diagnostics: self.diagnostics.clone(),
        }
    }
}
