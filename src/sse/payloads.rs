//! Payload deserialization structs
//!
//! Internal shapes used to decode the JSON object carried by each data frame.
//! Public value types (reviews, explanations, ...) live in `events` and are
//! decoded directly where the wire shape matches them.

use serde::Deserialize;
use serde_json::Value;

use crate::sse::events::Review;

/// Outer object of every data frame: `{"phase": ..., "content": ...}`.
///
/// The pipeline puts `iteration` payloads under `data` and everything else
/// under `content`, so both are captured.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope {
    pub phase: String,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// `final_code` content. The review is absent when the pipeline loads
/// user-supplied code before reviewing it.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FinalCodePayload {
    pub code: String,
    #[serde(default)]
    pub review: Option<Review>,
}

/// `final_code_update` content
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FinalCodeUpdatePayload {
    pub review: Review,
}

/// `feasibility_alert` content; the analyst may leave either field null.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FeasibilityAlertPayload {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
}
