//! Frame parsing logic
//!
//! Turns one [`Frame`] into a typed [`Event`], or a [`ParseFailure`] scoped to
//! that frame. Parsing is pure; logging of failures is left to the caller so
//! that the parser can be reused in tests and benchmarks without noise.

mod code;
mod progress;
mod report;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::sse::events::{Event, ParseFailure, PhaseTag};
use crate::sse::frame::Frame;
use crate::sse::payloads::Envelope;

use code::{
    parse_clear_code_event, parse_code_chunk_event, parse_final_code_event,
    parse_final_code_update_event,
};
use progress::{parse_done_event, parse_iteration_event, parse_log_event};
use report::{
    parse_diagram_event, parse_explanation_event, parse_failure_report_event,
    parse_feasibility_alert_event,
};

/// Longest frame excerpt kept in a not-a-data-line failure.
const PREVIEW_CHARS: usize = 40;

/// Parse a complete frame.
pub fn parse_frame(frame: &Frame) -> Result<Event, ParseFailure> {
    match frame.payload() {
        Some(payload) => parse_payload(payload),
        None => Err(ParseFailure::NotADataLine {
            preview: frame.text().chars().take(PREVIEW_CHARS).collect(),
        }),
    }
}

/// Parse the JSON text that follows the `data: ` prefix.
pub fn parse_payload(payload: &str) -> Result<Event, ParseFailure> {
    let envelope: Envelope =
        serde_json::from_str(payload).map_err(|e| ParseFailure::MalformedPayload {
            phase: None,
            message: e.to_string(),
        })?;

    let Some(tag) = PhaseTag::from_wire(&envelope.phase) else {
        return Err(ParseFailure::UnknownPhase {
            phase: envelope.phase,
        });
    };

    match tag {
        PhaseTag::Log => parse_log_event(tag, content_of(envelope.content)),
        PhaseTag::Iteration => {
            // The pipeline sends iteration records under `data`; accept
            // `content` as well, preferring `data` when both are present.
            let body = envelope.data.or(envelope.content);
            parse_iteration_event(tag, content_of(body))
        }
        PhaseTag::CodeChunk => parse_code_chunk_event(tag, content_of(envelope.content)),
        PhaseTag::ClearCode => Ok(parse_clear_code_event()),
        PhaseTag::FinalCodeUpdate => {
            parse_final_code_update_event(tag, content_of(envelope.content))
        }
        PhaseTag::FinalCode => parse_final_code_event(tag, content_of(envelope.content)),
        PhaseTag::Diagram => parse_diagram_event(tag, content_of(envelope.content)),
        PhaseTag::Explanation => parse_explanation_event(tag, content_of(envelope.content)),
        PhaseTag::FailureReport => {
            parse_failure_report_event(tag, content_of(envelope.content))
        }
        PhaseTag::FeasibilityAlert => {
            parse_feasibility_alert_event(tag, content_of(envelope.content))
        }
        PhaseTag::Done => Ok(parse_done_event()),
    }
}

fn content_of(value: Option<Value>) -> Value {
    value.unwrap_or(Value::Null)
}

/// Decode a phase's content into its typed shape.
fn decode<T: DeserializeOwned>(tag: PhaseTag, content: Value) -> Result<T, ParseFailure> {
    serde_json::from_value(content).map_err(|e| ParseFailure::MalformedPayload {
        phase: Some(tag.as_str().to_string()),
        message: e.to_string(),
    })
}
