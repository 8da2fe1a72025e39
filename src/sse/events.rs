//! Event type definitions for the pipeline stream.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Tag identifying which part of the pipeline an event reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseTag {
    Log,
    Iteration,
    CodeChunk,
    ClearCode,
    FinalCodeUpdate,
    FinalCode,
    Diagram,
    Explanation,
    FailureReport,
    FeasibilityAlert,
    /// Sent once when the pipeline has nothing more to report.
    Done,
}

impl PhaseTag {
    /// All known phases, in the order the pipeline usually emits them.
    pub const ALL: [PhaseTag; 11] = [
        PhaseTag::Log,
        PhaseTag::FeasibilityAlert,
        PhaseTag::CodeChunk,
        PhaseTag::ClearCode,
        PhaseTag::FinalCode,
        PhaseTag::Iteration,
        PhaseTag::FinalCodeUpdate,
        PhaseTag::FailureReport,
        PhaseTag::Diagram,
        PhaseTag::Explanation,
        PhaseTag::Done,
    ];

    /// Wire name of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseTag::Log => "log",
            PhaseTag::Iteration => "iteration",
            PhaseTag::CodeChunk => "code_chunk",
            PhaseTag::ClearCode => "clear_code",
            PhaseTag::FinalCodeUpdate => "final_code_update",
            PhaseTag::FinalCode => "final_code",
            PhaseTag::Diagram => "diagram",
            PhaseTag::Explanation => "explanation",
            PhaseTag::FailureReport => "failure_report",
            PhaseTag::FeasibilityAlert => "feasibility_alert",
            PhaseTag::Done => "done",
        }
    }

    /// Look up a phase by its wire name.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == name)
    }
}

impl fmt::Display for PhaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reviewer verdict on a piece of generated code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub pass: bool,
    pub score: f64,
    #[serde(default)]
    pub critique: String,
}

/// One review round of the generate/test/review loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub round: u32,
    pub review: Review,
    /// Candidate code reviewed in this round, when the pipeline includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Two-level explanation of the produced code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    /// Plain-language walkthrough
    pub simple: String,
    /// Formal write-up (complexity, structure, design)
    pub academic: String,
}

/// Terminal failure reported by the pipeline itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    pub message: String,
    pub issues: String,
}

/// Advisory notice that the pipeline abandoned the submitted approach.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PivotAlert {
    pub reason: String,
    pub recommendation: String,
}

/// A typed event decoded from one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Progress line
    Log(String),
    /// Completed review round
    Iteration(IterationRecord),
    /// Streamed code token
    CodeChunk(String),
    /// Discard the streamed code so far
    ClearCode,
    /// Review verdict without touching the code
    FinalCodeUpdate { review: Review },
    /// Full replacement of code and review
    FinalCode {
        code: String,
        review: Option<Review>,
    },
    /// Dependency diagram source text
    Diagram(String),
    Explanation(Explanation),
    FailureReport(FailureReport),
    FeasibilityAlert(PivotAlert),
    Done,
}

impl Event {
    /// The phase this event belongs to.
    pub fn phase(&self) -> PhaseTag {
        match self {
            Event::Log(_) => PhaseTag::Log,
            Event::Iteration(_) => PhaseTag::Iteration,
            Event::CodeChunk(_) => PhaseTag::CodeChunk,
            Event::ClearCode => PhaseTag::ClearCode,
            Event::FinalCodeUpdate { .. } => PhaseTag::FinalCodeUpdate,
            Event::FinalCode { .. } => PhaseTag::FinalCode,
            Event::Diagram(_) => PhaseTag::Diagram,
            Event::Explanation(_) => PhaseTag::Explanation,
            Event::FailureReport(_) => PhaseTag::FailureReport,
            Event::FeasibilityAlert(_) => PhaseTag::FeasibilityAlert,
            Event::Done => PhaseTag::Done,
        }
    }
}

/// Classification of a frame that did not produce an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseFailureKind {
    NotADataLine,
    MalformedPayload,
    UnknownPhase,
}

impl ParseFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseFailureKind::NotADataLine => "not-a-data-line",
            ParseFailureKind::MalformedPayload => "malformed-payload",
            ParseFailureKind::UnknownPhase => "unknown-phase",
        }
    }
}

/// Why a single frame could not be turned into an event.
///
/// Failures are scoped to their frame; none of them ends a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    /// Frame lacks the `data: ` prefix (keep-alives, comments, blank frames).
    #[error("frame is not a data line: {preview:?}")]
    NotADataLine { preview: String },

    /// Payload is not valid JSON, or misses fields its phase requires.
    #[error("malformed payload{}: {message}", phase_suffix(.phase))]
    MalformedPayload {
        phase: Option<String>,
        message: String,
    },

    /// Payload decoded but names a phase this client does not know.
    #[error("unknown phase '{phase}'")]
    UnknownPhase { phase: String },
}

fn phase_suffix(phase: &Option<String>) -> String {
    match phase {
        Some(p) => format!(" for phase '{}'", p),
        None => String::new(),
    }
}

impl ParseFailure {
    pub fn kind(&self) -> ParseFailureKind {
        match self {
            ParseFailure::NotADataLine { .. } => ParseFailureKind::NotADataLine,
            ParseFailure::MalformedPayload { .. } => ParseFailureKind::MalformedPayload,
            ParseFailure::UnknownPhase { .. } => ParseFailureKind::UnknownPhase,
        }
    }

    /// Transport noise that is dropped without being recorded.
    pub fn is_noise(&self) -> bool {
        self.kind() == ParseFailureKind::NotADataLine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_tag_wire_names_round_trip() {
        for tag in PhaseTag::ALL {
            assert_eq!(PhaseTag::from_wire(tag.as_str()), Some(tag));
        }
        assert_eq!(PhaseTag::from_wire("stream_finished"), None);
        assert_eq!(PhaseTag::from_wire("LOG"), None);
    }

    #[test]
    fn test_event_phase() {
        assert_eq!(Event::Log("x".into()).phase(), PhaseTag::Log);
        assert_eq!(Event::ClearCode.phase(), PhaseTag::ClearCode);
        assert_eq!(
            Event::FinalCode {
                code: String::new(),
                review: None
            }
            .phase(),
            PhaseTag::FinalCode
        );
        assert_eq!(Event::Done.phase().to_string(), "done");
    }

    #[test]
    fn test_parse_failure_display() {
        let err = ParseFailure::UnknownPhase {
            phase: "bogus".to_string(),
        };
        assert_eq!(err.to_string(), "unknown phase 'bogus'");

        let err = ParseFailure::MalformedPayload {
            phase: Some("log".to_string()),
            message: "expected a string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "malformed payload for phase 'log': expected a string"
        );

        let err = ParseFailure::MalformedPayload {
            phase: None,
            message: "EOF".to_string(),
        };
        assert_eq!(err.to_string(), "malformed payload: EOF");
    }

    #[test]
    fn test_parse_failure_kind() {
        let noise = ParseFailure::NotADataLine {
            preview: ": ping".to_string(),
        };
        assert!(noise.is_noise());
        assert_eq!(noise.kind().as_str(), "not-a-data-line");

        let unknown = ParseFailure::UnknownPhase {
            phase: "x".to_string(),
        };
        assert!(!unknown.is_noise());
        assert_eq!(unknown.kind(), ParseFailureKind::UnknownPhase);
    }
}
