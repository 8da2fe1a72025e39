//! Phase reducer: folds events into an [`Accumulator`].
//!
//! Every phase is accepted in any order and any number of times; the reducer
//! never rejects a transition. A `diagram` before any code, or code chunks
//! after a `failure_report`, are applied like anything else.
//!
//! | Phase | Effect |
//! |---|---|
//! | `log` | append to `logs` |
//! | `iteration` | append to `iterations` |
//! | `code_chunk` | append to `code_buffer` |
//! | `clear_code` | empty `code_buffer` |
//! | `final_code_update` | set `review` |
//! | `final_code` | replace `code_buffer` and `review` together |
//! | `diagram`, `explanation`, `failure_report`, `feasibility_alert` | replace |
//! | `done` | set `completed` |

use crate::sse::Event;
use crate::state::accumulator::Accumulator;

/// An event stamped with the epoch of the stream it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedEvent {
    pub epoch: u64,
    pub event: Event,
}

impl TaggedEvent {
    pub fn new(epoch: u64, event: Event) -> Self {
        Self { epoch, event }
    }
}

/// Result of offering a tagged event to an accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The event belongs to another epoch and was ignored.
    Stale,
}

/// Pure fold step: consume the state and an event, return the next state.
pub fn reduce(mut acc: Accumulator, event: Event) -> Accumulator {
    apply_event(&mut acc, event);
    acc
}

/// Apply an event in place.
pub fn apply_event(acc: &mut Accumulator, event: Event) {
    match event {
        Event::Log(line) => acc.logs.push(line),
        Event::Iteration(record) => acc.iterations.push(record),
        Event::CodeChunk(text) => acc.code_buffer.push_str(&text),
        Event::ClearCode => acc.code_buffer.clear(),
        Event::FinalCodeUpdate { review } => acc.review = Some(review),
        Event::FinalCode { code, review } => {
            acc.code_buffer = code;
            acc.review = review;
        }
        Event::Diagram(text) => acc.diagram = Some(text),
        Event::Explanation(explanation) => acc.explanation = Some(explanation),
        Event::FailureReport(report) => acc.failure_report = Some(report),
        Event::FeasibilityAlert(alert) => acc.pivot_alert = Some(alert),
        Event::Done => acc.completed = true,
    }
}

/// Apply an event only if it was produced for the accumulator's epoch.
pub fn apply_tagged(acc: &mut Accumulator, tagged: TaggedEvent) -> ApplyOutcome {
    if tagged.epoch != acc.epoch {
        return ApplyOutcome::Stale;
    }
    apply_event(acc, tagged.event);
    ApplyOutcome::Applied
}
