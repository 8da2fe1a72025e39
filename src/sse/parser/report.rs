//! Report event parsers (diagram, explanation, failure_report, feasibility_alert)

use serde_json::Value;

use super::decode;
use crate::sse::events::{Event, Explanation, FailureReport, ParseFailure, PhaseTag, PivotAlert};
use crate::sse::payloads::FeasibilityAlertPayload;

/// Parse diagram event. The text is passed through untouched, fences and all.
pub(super) fn parse_diagram_event(tag: PhaseTag, content: Value) -> Result<Event, ParseFailure> {
    decode::<String>(tag, content).map(Event::Diagram)
}

/// Parse explanation event
pub(super) fn parse_explanation_event(
    tag: PhaseTag,
    content: Value,
) -> Result<Event, ParseFailure> {
    decode::<Explanation>(tag, content).map(Event::Explanation)
}

/// Parse failure_report event
pub(super) fn parse_failure_report_event(
    tag: PhaseTag,
    content: Value,
) -> Result<Event, ParseFailure> {
    decode::<FailureReport>(tag, content).map(Event::FailureReport)
}

/// Parse feasibility_alert event
pub(super) fn parse_feasibility_alert_event(
    tag: PhaseTag,
    content: Value,
) -> Result<Event, ParseFailure> {
    let payload: FeasibilityAlertPayload = decode(tag, content)?;
    Ok(Event::FeasibilityAlert(PivotAlert {
        reason: payload.reason.unwrap_or_default(),
        recommendation: payload.recommendation.unwrap_or_default(),
    }))
}
