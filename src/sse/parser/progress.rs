//! Progress event parsers (log, iteration, done)

use serde_json::Value;

use super::decode;
use crate::sse::events::{Event, IterationRecord, ParseFailure, PhaseTag};

/// Parse log event; content is the log line itself
pub(super) fn parse_log_event(tag: PhaseTag, content: Value) -> Result<Event, ParseFailure> {
    decode::<String>(tag, content).map(Event::Log)
}

/// Parse iteration event
pub(super) fn parse_iteration_event(
    tag: PhaseTag,
    content: Value,
) -> Result<Event, ParseFailure> {
    decode::<IterationRecord>(tag, content).map(Event::Iteration)
}

/// Parse done event; its content is always empty and ignored
pub(super) fn parse_done_event() -> Event {
    Event::Done
}
