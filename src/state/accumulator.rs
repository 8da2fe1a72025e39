//! The view model folded from pipeline events.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::sse::{Explanation, FailureReport, IterationRecord, PivotAlert, Review};

/// First fenced code block, with an optional language tag.
static CODE_FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```(?:\w+)?\n([\s\S]*?)```").expect("Invalid code fence regex pattern")
});

/// Everything the console knows about one submission.
///
/// Created empty for every epoch and only ever changed by the reducer. The
/// session hands out clones as immutable snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Accumulator {
    /// Epoch of the session that produced this state
    pub epoch: u64,
    /// Progress lines, in arrival order
    pub logs: Vec<String>,
    /// Review rounds, in arrival order
    pub iterations: Vec<IterationRecord>,
    /// Code assembled from streamed tokens, or the last full replacement
    pub code_buffer: String,
    /// Latest review verdict for the code
    pub review: Option<Review>,
    /// Dependency diagram source
    pub diagram: Option<String>,
    pub explanation: Option<Explanation>,
    /// Set when the pipeline gave up
    pub failure_report: Option<FailureReport>,
    /// Set when the pipeline abandoned the submitted approach
    pub pivot_alert: Option<PivotAlert>,
    /// The pipeline sent its closing `done` event
    pub completed: bool,
}

impl Accumulator {
    /// Fresh, empty state for an epoch.
    pub fn new(epoch: u64) -> Self {
        Self {
            epoch,
            ..Self::default()
        }
    }

    /// Whether the pipeline reported a terminal failure.
    pub fn has_failed(&self) -> bool {
        self.failure_report.is_some()
    }

    /// True until the first event lands.
    pub fn is_empty(&self) -> bool {
        *self == Self::new(self.epoch)
    }

    /// Body of the first fenced code block in the buffer, or the whole
    /// buffer when the model did not fence its answer.
    pub fn clean_code(&self) -> &str {
        match CODE_FENCE_REGEX.captures(&self.code_buffer) {
            Some(caps) => caps.get(1).map_or("", |m| m.as_str().trim()),
            None => &self.code_buffer,
        }
    }

    /// Round number of the most recent review, if any.
    pub fn latest_round(&self) -> Option<u32> {
        self.iterations.last().map(|record| record.round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let acc = Accumulator::new(7);
        assert_eq!(acc.epoch, 7);
        assert!(acc.is_empty());
        assert!(!acc.has_failed());
        assert!(acc.latest_round().is_none());
    }

    #[test]
    fn test_clean_code_extracts_fenced_block() {
        let acc = Accumulator {
            code_buffer: "Here you go:\n```python\nprint(1)\n```\nEnjoy".to_string(),
            ..Accumulator::default()
        };
        assert_eq!(acc.clean_code(), "print(1)");
    }

    #[test]
    fn test_clean_code_without_language_tag() {
        let acc = Accumulator {
            code_buffer: "```\nint x;\n```".to_string(),
            ..Accumulator::default()
        };
        assert_eq!(acc.clean_code(), "int x;");
    }

    #[test]
    fn test_clean_code_unfenced_returns_buffer() {
        let acc = Accumulator {
            code_buffer: "print(2)".to_string(),
            ..Accumulator::default()
        };
        assert_eq!(acc.clean_code(), "print(2)");
    }

    #[test]
    fn test_clean_code_unterminated_fence_returns_buffer() {
        // Mid-stream the closing fence has not arrived yet.
        let acc = Accumulator {
            code_buffer: "```python\nprint(".to_string(),
            ..Accumulator::default()
        };
        assert_eq!(acc.clean_code(), "```python\nprint(");
    }

    #[test]
    fn test_serializes_to_json() {
        let acc = Accumulator {
            logs: vec!["start".to_string()],
            ..Accumulator::new(1)
        };
        let json = serde_json::to_value(&acc).unwrap();
        assert_eq!(json["epoch"], 1);
        assert_eq!(json["logs"][0], "start");
        assert!(json["review"].is_null());
    }
}
