//! Code assembly event parsers (code_chunk, clear_code, final_code, final_code_update)

use serde_json::Value;

use super::decode;
use crate::sse::events::{Event, ParseFailure, PhaseTag};
use crate::sse::payloads::{FinalCodePayload, FinalCodeUpdatePayload};

/// Parse code_chunk event; content is the raw token text
pub(super) fn parse_code_chunk_event(
    tag: PhaseTag,
    content: Value,
) -> Result<Event, ParseFailure> {
    decode::<String>(tag, content).map(Event::CodeChunk)
}

/// Parse clear_code event; the content is an empty string and carries nothing
pub(super) fn parse_clear_code_event() -> Event {
    Event::ClearCode
}

/// Parse final_code_update event
pub(super) fn parse_final_code_update_event(
    tag: PhaseTag,
    content: Value,
) -> Result<Event, ParseFailure> {
    let payload: FinalCodeUpdatePayload = decode(tag, content)?;
    Ok(Event::FinalCodeUpdate {
        review: payload.review,
    })
}

/// Parse final_code event
pub(super) fn parse_final_code_event(
    tag: PhaseTag,
    content: Value,
) -> Result<Event, ParseFailure> {
    let payload: FinalCodePayload = decode(tag, content)?;
    Ok(Event::FinalCode {
        code: payload.code,
        review: payload.review,
    })
}
