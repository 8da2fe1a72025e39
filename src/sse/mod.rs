//! Event stream decoding
//!
//! The pipeline streams its progress as Server-Sent-Events-style records:
//!
//! ```text
//! data: {"phase":"log","content":"analysing task..."}\n\n
//! data: {"phase":"code_chunk","content":"print("}\n\n
//! ```
//!
//! - Records end with an empty line (`\n\n`)
//! - Only records starting with `data: ` carry events; anything else is noise
//! - The JSON payload names its `phase` and carries a phase-specific `content`
//!
//! # Module structure
//! - `frame` - FrameSplitter: chunk bytes to complete frames
//! - `events` - Event, PhaseTag, ParseFailure and the payload value types
//! - `payloads` - Internal payload deserialization structs
//! - `parser` - Parsing logic (parse_frame, parse_payload)
//! - `decoder` - EventDecoder combining the splitter and the parser

mod decoder;
mod events;
mod frame;
mod parser;
mod payloads;

// Re-export public types
pub use decoder::EventDecoder;
pub use events::{
    Event, Explanation, FailureReport, IterationRecord, ParseFailure, ParseFailureKind, PhaseTag,
    PivotAlert, Review,
};
pub use frame::{Frame, FrameSplitter, DATA_PREFIX, FRAME_DELIMITER};
pub use parser::{parse_frame, parse_payload};
