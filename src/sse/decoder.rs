//! Stateful decoder from raw chunks to parsed events.

use crate::sse::events::{Event, ParseFailure};
use crate::sse::frame::FrameSplitter;
use crate::sse::parser::parse_frame;

/// Splits chunks into frames and parses each one.
///
/// One result per complete frame, in stream order. Failures are returned
/// rather than swallowed so the caller can decide what to record.
#[derive(Debug, Default)]
pub struct EventDecoder {
    splitter: FrameSplitter,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning a result for every frame it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Result<Event, ParseFailure>> {
        self.splitter.feed(chunk).iter().map(parse_frame).collect()
    }

    /// End of stream. Returns the number of undelimited bytes that were
    /// dropped.
    pub fn finish(&mut self) -> usize {
        let dropped = self.splitter.pending_len();
        let flushed = self.splitter.finish();
        debug_assert!(flushed.is_empty());
        dropped
    }

    pub fn pending_len(&self) -> usize {
        self.splitter.pending_len()
    }
}
